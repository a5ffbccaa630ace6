//! Document pipeline that ties all components together.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use crate::annex::{first_annex_offset, AnnexExtractor, PageSpans};
use crate::chunking::{ChunkedArticle, Chunker, TokenCounter};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::lawjson::{import_statute, law_name_from_path};
use crate::layout::LayoutDocument;
use crate::splitting::{extract_law_name, StructureParser};
use crate::types::{Annex, Article};

/// Suffix of chunked statute JSON outputs.
const CHUNKED_SUFFIX: &str = "_chunked";

/// Output of one processed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDocument {
    /// Source document identifier.
    pub source: Option<String>,

    /// Law name.
    pub law_name: Option<String>,

    /// Articles with their chunks, in document order.
    pub articles: Vec<ChunkedArticle>,

    /// Annexes, in document order.
    pub annexes: Vec<Annex>,
}

/// Process a PDF layout document.
///
/// Pages are normalized and joined; the structural parser and the annex
/// extractor then run side by side on the joined text. Article text ends at
/// the first annex header.
pub fn process_layout<C: TokenCounter + ?Sized>(
    document: &LayoutDocument,
    config: &PipelineConfig,
    counter: &C,
) -> Result<OutputDocument> {
    let chunker = Chunker::new(counter, config.max_tokens)?;
    let normalizer = &config.normalizer;

    let pages: Vec<String> = document
        .pages
        .iter()
        .map(|page| normalizer.normalize_document(page.text()))
        .collect();
    let spans = PageSpans::from_pages(&pages);
    let text = PageSpans::join(&pages);
    let article_end = first_annex_offset(&text).unwrap_or(text.len());

    let parser = StructureParser::from_config(config);
    let extractor = AnnexExtractor::new(normalizer.clone());
    let tables = document.table_source();
    let page_bboxes = document.page_bboxes();

    let (located, mut annexes) = rayon::join(
        || parser.parse(&text[..article_end]),
        || extractor.extract(&text, &spans, &tables, &page_bboxes),
    );

    let source = document.source.clone();
    let law_name = layout_law_name(document);
    tracing::info!(
        source = ?source,
        law_name = ?law_name,
        articles = located.len(),
        annexes = annexes.len(),
        rules = normalizer.rules().version(),
        "Parsed layout document"
    );

    let articles = located
        .into_iter()
        .map(|located| {
            let mut article = located.article;
            article.page_number = spans.index_to_page(located.offset);
            article.bbox = article
                .page_number
                .and_then(|page| document.article_bbox(page, &article.number));
            article.source.clone_from(&source);
            article.law_name.clone_from(&law_name);
            chunk(&chunker, article)
        })
        .collect::<Result<Vec<_>>>()?;

    for annex in &mut annexes {
        annex.source.clone_from(&source);
        annex.law_name.clone_from(&law_name);
    }

    Ok(OutputDocument {
        source,
        law_name,
        articles,
        annexes,
    })
}

/// Process statute JSON.
pub fn process_statute_json<C: TokenCounter + ?Sized>(
    value: &Value,
    law_name: &str,
    source: Option<&str>,
    config: &PipelineConfig,
    counter: &C,
) -> Result<OutputDocument> {
    let chunker = Chunker::new(counter, config.max_tokens)?;
    let source = source.map(String::from);
    let law_name = Some(law_name.to_string());

    let articles = import_statute(value)?
        .into_iter()
        .map(|mut article| {
            article.source.clone_from(&source);
            article.law_name.clone_from(&law_name);
            chunk(&chunker, article)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OutputDocument {
        source,
        law_name,
        articles,
        annexes: Vec::new(),
    })
}

/// Load and process a layout document file.
pub fn process_layout_file<C: TokenCounter + ?Sized>(
    path: &Path,
    config: &PipelineConfig,
    counter: &C,
) -> Result<OutputDocument> {
    let document = LayoutDocument::from_path(path)?;
    process_layout(&document, config, counter)
}

/// Load and process a statute JSON file.
pub fn process_statute_file<C: TokenCounter + ?Sized>(
    path: &Path,
    config: &PipelineConfig,
    counter: &C,
) -> Result<OutputDocument> {
    let json = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&json)?;
    let source = path.file_name().map(|name| name.to_string_lossy());
    process_statute_json(
        &value,
        &law_name_from_path(path),
        source.as_deref(),
        config,
        counter,
    )
}

/// `<dir>/<stem>.json` for a layout document.
#[must_use]
pub fn layout_output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(format!("{stem}.json"))
}

/// `<dir>/<law name>_chunked.json` for statute JSON.
#[must_use]
pub fn statute_output_path(dir: &Path, input: &Path) -> PathBuf {
    dir.join(format!("{}{CHUNKED_SUFFIX}.json", law_name_from_path(input)))
}

/// Write an output document as pretty-printed JSON, creating the parent
/// directory if needed.
pub fn write_output(document: &OutputDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn chunk<C: TokenCounter + ?Sized>(
    chunker: &Chunker<'_, C>,
    article: Article,
) -> Result<ChunkedArticle> {
    let chunks = chunker.chunk_article(&article)?;
    Ok(ChunkedArticle::new(article, &chunks))
}

/// Law name from the first page, read before running titles are removed.
/// Falls back to the source file stem.
fn layout_law_name(document: &LayoutDocument) -> Option<String> {
    document
        .pages
        .first()
        .map(|page| page.text().nfc().collect::<String>())
        .and_then(|text| extract_law_name(&text))
        .or_else(|| {
            document.source.as_deref().and_then(|source| {
                Path::new(source)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutPage;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn words(text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn page(text: &str) -> LayoutPage {
        LayoutPage {
            text: Some(text.to_string()),
            ..LayoutPage::default()
        }
    }

    fn document() -> LayoutDocument {
        LayoutDocument {
            source: Some("산업안전보건기준에 관한 규칙.pdf".to_string()),
            pages: vec![
                page("산업안전보건기준에 관한 규칙\n제1편 총칙\n제1장 통칙\n제1조(목적) 이 규칙은 산업안전보건법에서 위임한 사항을 규정함을 목적으로 한다."),
                page("제2조(정의) 이 규칙에서 사용하는 용어의 뜻은 다음과 같다. 1. 추락 위험이 있는 장소 2. 낙하물 위험이 있는 장소\n[별표 1] 위험물질의 종류(제16조 관련)\n1. 폭발성 물질"),
            ],
        }
    }

    #[test]
    fn test_process_layout() {
        let output = process_layout(&document(), &PipelineConfig::default(), &words).unwrap();

        assert_eq!(output.law_name.as_deref(), Some("산업안전보건기준에 관한 규칙"));
        assert_eq!(output.articles.len(), 2);

        let first = &output.articles[0];
        assert_eq!(first.article.number, "제1조");
        assert_eq!(first.article.page_number, Some(1));
        assert_eq!(first.article.part.as_deref(), Some("제1편 총칙"));
        assert_eq!(first.article.chapter.as_deref(), Some("제1장 통칙"));
        assert_eq!(first.article.law_name, output.law_name);

        let second = &output.articles[1];
        assert_eq!(second.article.number, "제2조");
        assert_eq!(second.article.page_number, Some(2));
        assert_eq!(second.article.paragraphs[0].items.len(), 2);
        assert!(!second.embedding_chunks[0].contains("별표"));

        assert_eq!(output.annexes.len(), 1);
        assert_eq!(output.annexes[0].annex_number, "별표 1");
        assert_eq!(output.annexes[0].page_numbers, vec![2]);
        assert_eq!(
            output.annexes[0].source.as_deref(),
            Some("산업안전보건기준에 관한 규칙.pdf")
        );
    }

    #[test]
    fn test_law_name_falls_back_to_source() {
        let document = LayoutDocument {
            source: Some("규칙.pdf".to_string()),
            pages: vec![page("제1조(목적) 이 규칙은 목적을 규정한다.")],
        };
        assert_eq!(layout_law_name(&document).as_deref(), Some("규칙"));
    }

    #[test]
    fn test_tokenizer_failure_fails_document() {
        struct Offline;
        impl TokenCounter for Offline {
            fn count_tokens(&self, _text: &str) -> Result<usize> {
                Err(crate::error::IngestError::Tokenization("offline".to_string()))
            }
        }
        assert!(process_layout(&document(), &PipelineConfig::default(), &Offline).is_err());
    }

    #[test]
    fn test_process_statute_json() {
        let value = json!({ "법령": { "조문": { "조문단위": [
            { "조문여부": "조문", "조문번호": "1", "조문제목": "목적",
              "조문내용": "제1조(목적) 이 법은 안전을 목적으로 한다. <개정 2020. 1. 1.>" }
        ] } } });
        let output = process_statute_json(
            &value,
            "산업안전보건법",
            Some("산업안전보건법_clean.json"),
            &PipelineConfig::default(),
            &words,
        )
        .unwrap();

        assert_eq!(output.articles.len(), 1);
        let article = &output.articles[0];
        assert_eq!(article.article.law_name.as_deref(), Some("산업안전보건법"));
        assert_eq!(article.embedding_chunks.len(), 1);
        assert_eq!(article.all_change_dates, vec!["2020.1.1"]);
        assert!(output.annexes.is_empty());
    }

    #[test]
    fn test_output_paths() {
        let dir = Path::new("out");
        assert_eq!(
            layout_output_path(dir, Path::new("in/규칙.json")),
            PathBuf::from("out/규칙.json")
        );
        assert_eq!(
            statute_output_path(dir, Path::new("in/산업안전보건법_clean.json")),
            PathBuf::from("out/산업안전보건법_chunked.json")
        );
    }

    #[test]
    fn test_write_output_is_pretty_unescaped_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("규칙.json");
        let output = process_layout(&document(), &PipelineConfig::default(), &words).unwrap();

        write_output(&output, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"source\""));
        assert!(written.contains("산업안전보건기준에 관한 규칙"));

        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["articles"][0]["article_number"], "제1조");
        assert!(value["articles"][0]["embedding_chunks"].is_array());
    }
}
