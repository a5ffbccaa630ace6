//! Table recovery for annexes.

use crate::error::TableError;
use crate::types::TableRecord;

/// A table as rows of optional cells, as PDF layout engines return them.
pub type RawTable = Vec<Vec<Option<String>>>;

/// Source of pre-extracted tables per PDF page.
///
/// Implementations must be shareable across threads; the annex extractor
/// runs next to the structural parser.
pub trait TableSource: Sync {
    /// Tables found on the 1-based `page`.
    fn tables_for_page(&self, page: usize) -> Result<Vec<RawTable>, TableError>;
}

impl<F> TableSource for F
where
    F: Fn(usize) -> Result<Vec<RawTable>, TableError> + Sync,
{
    fn tables_for_page(&self, page: usize) -> Result<Vec<RawTable>, TableError> {
        self(page)
    }
}

/// A source without tables; every annex falls back to text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTables;

impl TableSource for NoTables {
    fn tables_for_page(&self, _page: usize) -> Result<Vec<RawTable>, TableError> {
        Ok(Vec::new())
    }
}

/// Collapse whitespace in a cell; missing cells become empty.
#[must_use]
pub fn clean_cell(cell: Option<&str>) -> String {
    cell.map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Turn a header row into column names, naming blank ones `col_N`.
#[must_use]
pub fn normalize_header_row(row: &[Option<String>]) -> Vec<String> {
    row.iter()
        .enumerate()
        .map(|(i, cell)| {
            let header = clean_cell(cell.as_deref());
            if header.is_empty() {
                format!("col_{}", i + 1)
            } else {
                header
            }
        })
        .collect()
}

/// Whether a table is worth converting: a header plus at least one row,
/// and some content.
#[must_use]
pub fn is_candidate_table(table: &RawTable) -> bool {
    table.len() >= 2
        && table
            .iter()
            .flatten()
            .any(|cell| cell.as_deref().is_some_and(|c| !c.trim().is_empty()))
}

/// Convert a table to records keyed by its first row.
///
/// Rows are padded with empty cells or truncated to the header length.
#[must_use]
pub fn table_to_records(table: &RawTable) -> Vec<TableRecord> {
    let Some((header_row, rows)) = table.split_first() else {
        return Vec::new();
    };
    let headers = normalize_header_row(header_row);

    rows.iter()
        .map(|row| {
            let mut record = TableRecord::new();
            for (i, header) in headers.iter().enumerate() {
                let cell = row.get(i).and_then(|c| c.as_deref());
                record.insert(header.clone(), clean_cell(cell));
            }
            record
        })
        .collect()
}

/// Flatten records into one line each for direct indexing.
///
/// `"유해인자=벤젠 | TWA(ppm)=0.5 | 근거=별표 19 / 제145조제1항 / 제목"`;
/// empty values are skipped.
#[must_use]
pub fn records_to_embed_rows(
    records: &[TableRecord],
    annex_number: &str,
    related_article: Option<&str>,
    title: Option<&str>,
) -> Vec<String> {
    let basis = std::iter::once(annex_number)
        .chain(related_article)
        .chain(title)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" / ");

    records
        .iter()
        .map(|record| {
            record
                .iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(key, value)| format!("{key}={value}"))
                .chain(std::iter::once(format!("근거={basis}")))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: &[&[Option<&str>]]) -> RawTable {
        rows.iter()
            .map(|row| row.iter().map(|c| c.map(String::from)).collect())
            .collect()
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell(Some("  TWA\n(ppm) ")), "TWA (ppm)");
        assert_eq!(clean_cell(None), "");
    }

    #[test]
    fn test_blank_headers_get_column_names() {
        let row = vec![Some("유해인자".to_string()), None, Some("  ".to_string())];
        assert_eq!(normalize_header_row(&row), vec!["유해인자", "col_2", "col_3"]);
    }

    #[test]
    fn test_candidate_table_rules() {
        assert!(!is_candidate_table(&table(&[&[Some("헤더")]])));
        assert!(!is_candidate_table(&table(&[&[None, Some(" ")], &[None, None]])));
        assert!(is_candidate_table(&table(&[&[Some("a")], &[None]])));
    }

    #[test]
    fn test_rows_are_padded_and_truncated() {
        let records = table_to_records(&table(&[
            &[Some("유해인자"), Some("TWA(ppm)")],
            &[Some("벤젠")],
            &[Some("톨루엔"), Some("50"), Some("extra")],
        ]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("TWA(ppm)"), Some(""));
        assert_eq!(records[1].len(), 2);
        assert_eq!(records[1].get("TWA(ppm)"), Some("50"));
    }

    #[test]
    fn test_embed_rows_skip_empty_values() {
        let records = table_to_records(&table(&[
            &[Some("유해인자"), Some("TWA(ppm)"), None],
            &[Some("벤젠"), Some("0.5"), None],
        ]));
        let rows = records_to_embed_rows(
            &records,
            "별표 19",
            Some("제145조제1항"),
            Some("유해인자별 노출 농도의 허용기준"),
        );
        assert_eq!(
            rows,
            vec!["유해인자=벤젠 | TWA(ppm)=0.5 | 근거=별표 19 / 제145조제1항 / 유해인자별 노출 농도의 허용기준"]
        );
    }

    #[test]
    fn test_closure_table_source() {
        let source = |page: usize| -> Result<Vec<RawTable>, TableError> {
            if page == 2 {
                Err(TableError::new(page, "broken"))
            } else {
                Ok(Vec::new())
            }
        };
        assert!(source.tables_for_page(1).is_ok());
        assert!(source.tables_for_page(2).is_err());
        assert!(NoTables.tables_for_page(1).unwrap().is_empty());
    }
}
