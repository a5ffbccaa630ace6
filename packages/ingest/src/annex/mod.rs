//! Annex (별표) extraction.
//!
//! Annex headers ("[별표 N]", often behind "■" and the law title) open
//! blocks that run to the next header or the end of the document. Each
//! block is resolved to its PDF pages, and tables on those pages are turned
//! into records; without a usable table the block keeps only its text.

mod pages;
mod table;

use std::sync::LazyLock;

use regex::Regex;

use crate::amendment::strip_annotations;
use crate::normalize::Normalizer;
use crate::types::{Annex, BoundingBox};

pub use pages::PageSpans;
pub use table::{
    clean_cell, is_candidate_table, normalize_header_row, records_to_embed_rows,
    table_to_records, NoTables, RawTable, TableSource,
};

/// Annex header anywhere in the first 100 characters of a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANNEX_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*(?:■[^\S\n]*)?.{0,100}?\[별표\s*(\d+(?:의\d+)?)\][^\S\n]*")
        .expect("valid regex")
});

/// "제145조제1항 관련" back-reference.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static RELATED_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(제\d+조(?:의\d+)?(?:제\d+항)?)\s*관련").expect("valid regex")
});

/// Location of one annex in the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnexBlock {
    /// "별표 N".
    pub annex_number: String,

    /// Byte offset of the header line.
    pub start: usize,

    /// Byte offset where the block ends (next header or document end).
    pub end: usize,

    /// Byte offset right after the "[별표 N]" marker.
    pub header_end: usize,
}

/// Find annex blocks. Consecutive blocks share their boundary, so together
/// they tile `[first header, end of text)`.
#[must_use]
pub fn find_annex_blocks(text: &str) -> Vec<AnnexBlock> {
    let headers: Vec<(String, usize, usize)> = ANNEX_HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((format!("별표 {}", &caps[1]), whole.start(), whole.end()))
        })
        .collect();

    let ends: Vec<usize> = headers
        .iter()
        .skip(1)
        .map(|(_, start, _)| *start)
        .chain(std::iter::once(text.len()))
        .collect();

    headers
        .into_iter()
        .zip(ends)
        .map(|((annex_number, start, header_end), end)| AnnexBlock {
            annex_number,
            start,
            end,
            header_end,
        })
        .collect()
}

/// Offset of the first annex header, where the article text ends.
#[must_use]
pub fn first_annex_offset(text: &str) -> Option<usize> {
    ANNEX_HEADER.find(text).map(|m| m.start())
}

/// Best-effort annex title: the text after the header marker, else the
/// first following non-empty line. Bracketed notes are ignored.
///
/// This is a heuristic; multi-line titles come back truncated.
#[must_use]
pub fn resolve_title(after_header: &str) -> Option<String> {
    let cleaned = strip_annotations(after_header).text;
    cleaned
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}

/// Find a "제N조(제M항) 관련" back-reference.
#[must_use]
pub fn related_article(text: &str) -> Option<String> {
    RELATED_ARTICLE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Annex extractor over one normalized document.
#[derive(Debug, Clone, Default)]
pub struct AnnexExtractor {
    normalizer: Normalizer,
}

impl AnnexExtractor {
    /// Create a new extractor.
    #[must_use]
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Extract every annex of `text`.
    ///
    /// `page_bboxes` holds the word bounding box of each page, 1-based page
    /// `n` at index `n - 1`.
    pub fn extract(
        &self,
        text: &str,
        spans: &PageSpans,
        tables: &dyn TableSource,
        page_bboxes: &[Option<BoundingBox>],
    ) -> Vec<Annex> {
        let annexes: Vec<Annex> = find_annex_blocks(text)
            .into_iter()
            .map(|block| self.build_annex(text, &block, spans, tables, page_bboxes))
            .collect();
        tracing::debug!(annexes = annexes.len(), "Extracted annexes");
        annexes
    }

    fn build_annex(
        &self,
        text: &str,
        block: &AnnexBlock,
        spans: &PageSpans,
        tables: &dyn TableSource,
        page_bboxes: &[Option<BoundingBox>],
    ) -> Annex {
        let block_text = &text[block.start..block.end];
        let title = resolve_title(&text[block.header_end..block.end]);
        let related = related_article(block_text);

        let mut page_numbers = spans.span_to_pages(block.start, block.end);
        if page_numbers.is_empty() {
            page_numbers.extend(spans.index_to_page(block.start));
        }

        let table = self.collect_records(&block.annex_number, &page_numbers, tables);
        let embed_text_rows = records_to_embed_rows(
            &table,
            &block.annex_number,
            related.as_deref(),
            title.as_deref(),
        );

        let bboxes = page_numbers
            .iter()
            .map(|page| page_bboxes.get(page - 1).copied().flatten())
            .collect();

        Annex {
            annex_number: block.annex_number.clone(),
            title,
            related_article: related,
            table,
            embed_text_rows,
            content: self.normalizer.normalize_node(block_text),
            page_numbers,
            bboxes,
            law_name: None,
            source: None,
        }
    }

    fn collect_records(
        &self,
        annex_number: &str,
        pages: &[usize],
        tables: &dyn TableSource,
    ) -> Vec<crate::types::TableRecord> {
        let mut records = Vec::new();
        for &page in pages {
            match tables.tables_for_page(page) {
                Ok(found) => {
                    for table in found.iter().filter(|t| is_candidate_table(t)) {
                        records.extend(table_to_records(table));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        annex = %annex_number,
                        page,
                        error = %e,
                        "Table extraction failed, keeping annex text only"
                    );
                }
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = "제1조(목적) 본문\n■ 산업안전보건기준에 관한 규칙 [별표 1] <개정 2019. 12. 26.>\n위험물질의 종류(제16조 관련)\n1. 폭발성 물질\n[별표 2] 안전인증대상기계(제107조제1항 관련)\n구분 대상\n";

    fn page_texts() -> Vec<&'static str> {
        // Page 1 holds the article and annex 1, page 2 holds annex 2
        let split = DOCUMENT.find("[별표 2]").unwrap();
        vec![&DOCUMENT[..split - 1], &DOCUMENT[split..DOCUMENT.len() - 1]]
    }

    #[test]
    fn test_blocks_tile_from_first_header() {
        let blocks = find_annex_blocks(DOCUMENT);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start, first_annex_offset(DOCUMENT).unwrap());
        assert_eq!(blocks[0].end, blocks[1].start);
        assert_eq!(blocks[1].end, DOCUMENT.len());
        assert_eq!(blocks[0].annex_number, "별표 1");
    }

    #[test]
    fn test_header_needs_line_prefix_within_limit() {
        let long_prefix = format!("{} [별표 3]", "가".repeat(120));
        assert!(find_annex_blocks(&long_prefix).is_empty());
        assert_eq!(find_annex_blocks("[별표 1의2] 제목").len(), 1);
    }

    #[test]
    fn test_title_skips_annotations() {
        assert_eq!(
            resolve_title(" <개정 2019.\n12. 26.>\n위험물질의 종류(제16조 관련)\n1. 폭발성"),
            Some("위험물질의 종류(제16조 관련)".to_string())
        );
        assert_eq!(
            resolve_title(" 안전인증대상기계\n구분"),
            Some("안전인증대상기계".to_string())
        );
        assert_eq!(resolve_title("  \n "), None);
    }

    #[test]
    fn test_related_article() {
        assert_eq!(
            related_article("안전인증대상기계(제107조제1항 관련)").as_deref(),
            Some("제107조제1항")
        );
        assert_eq!(related_article("관련 없음"), None);
    }

    #[test]
    fn test_extract_with_tables_and_text_fallback() {
        let pages = page_texts();
        assert_eq!(PageSpans::join(&pages), DOCUMENT);
        let spans = PageSpans::from_pages(&pages);

        let tables = |page: usize| -> Result<Vec<RawTable>, TableError> {
            match page {
                2 => Ok(vec![vec![
                    vec![Some("구분".to_string()), Some("대상".to_string())],
                    vec![Some("기계".to_string()), Some("프레스".to_string())],
                ]]),
                _ => Err(TableError::new(page, "unreadable")),
            }
        };
        let bboxes = vec![Some([1.0, 2.0, 3.0, 4.0]), None];

        let annexes = AnnexExtractor::default().extract(DOCUMENT, &spans, &tables, &bboxes);
        assert_eq!(annexes.len(), 2);

        let first = &annexes[0];
        assert_eq!(first.title.as_deref(), Some("위험물질의 종류(제16조 관련)"));
        assert_eq!(first.related_article.as_deref(), Some("제16조"));
        assert_eq!(first.page_numbers, vec![1]);
        assert_eq!(first.bboxes, vec![Some([1.0, 2.0, 3.0, 4.0])]);
        assert!(first.table.is_empty());
        assert!(first.content.contains("폭발성 물질"));

        let second = &annexes[1];
        assert_eq!(second.page_numbers, vec![2]);
        assert_eq!(second.table.len(), 1);
        assert_eq!(
            second.embed_text_rows,
            vec!["구분=기계 | 대상=프레스 | 근거=별표 2 / 제107조제1항 / 안전인증대상기계(제107조제1항 관련)"]
        );
        assert_eq!(second.bboxes, vec![None]);
    }
}
