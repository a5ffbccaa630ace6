//! Pre-extracted PDF layout documents.
//!
//! The PDF layout engine runs outside this crate. Its output is read from
//! JSON:
//!
//! ```json
//! { "source": "규칙.pdf",
//!   "pages": [ { "text": "...",
//!                "words": [ { "text": "제24조", "x0": 1.0, "top": 2.0, "x1": 3.0, "bottom": 4.0 } ],
//!                "tables": [ [ ["헤더", null], ["값", "값"] ] ] } ] }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::annex::{RawTable, TableSource};
use crate::error::{Result, TableError};
use crate::types::BoundingBox;

/// A positioned word.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Word {
    /// Word text.
    pub text: String,
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub bottom: f64,
}

/// One PDF page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LayoutPage {
    /// Extracted text; pages without text have none.
    #[serde(default)]
    pub text: Option<String>,

    /// Words with positions.
    #[serde(default)]
    pub words: Vec<Word>,

    /// Tables found on the page.
    #[serde(default)]
    pub tables: Vec<RawTable>,
}

impl LayoutPage {
    /// Page text, empty when the page has none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// A whole PDF as extracted by the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LayoutDocument {
    /// Source PDF name.
    #[serde(default)]
    pub source: Option<String>,

    /// Pages in order.
    #[serde(default)]
    pub pages: Vec<LayoutPage>,
}

impl LayoutDocument {
    /// Parse a layout document from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a layout document.
    ///
    /// Without a `source` in the file, the PDF name is derived from the
    /// file stem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut document = Self::from_json_str(&json)?;
        if document.source.is_none() {
            document.source = path
                .file_stem()
                .map(|stem| format!("{}.pdf", stem.to_string_lossy()));
        }
        Ok(document)
    }

    /// Words on the 1-based `page`.
    #[must_use]
    pub fn words(&self, page: usize) -> &[Word] {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(|p| p.words.as_slice())
            .unwrap_or_default()
    }

    /// Union of all word boxes of every page, in page order.
    #[must_use]
    pub fn page_bboxes(&self) -> Vec<Option<BoundingBox>> {
        self.pages.iter().map(|p| words_bbox(&p.words)).collect()
    }

    /// Box of an article header on `page`: the words that carry the article
    /// number, or the whole page when none does.
    #[must_use]
    pub fn article_bbox(&self, page: usize, number: &str) -> Option<BoundingBox> {
        let words = self.words(page);
        let matching: Vec<Word> = words
            .iter()
            .filter(|w| w.text.contains(number))
            .cloned()
            .collect();
        words_bbox(&matching).or_else(|| words_bbox(words))
    }

    /// Table source backed by the pre-extracted tables.
    #[must_use]
    pub fn table_source(&self) -> JsonTableSource<'_> {
        JsonTableSource { pages: &self.pages }
    }
}

/// Union of word boxes.
#[must_use]
pub fn words_bbox(words: &[Word]) -> Option<BoundingBox> {
    let first = words.first()?;
    Some(words.iter().skip(1).fold(
        [first.x0, first.top, first.x1, first.bottom],
        |[x0, top, x1, bottom], w| {
            [x0.min(w.x0), top.min(w.top), x1.max(w.x1), bottom.max(w.bottom)]
        },
    ))
}

/// [`TableSource`] over the tables stored in a layout document.
#[derive(Debug, Clone, Copy)]
pub struct JsonTableSource<'a> {
    pages: &'a [LayoutPage],
}

impl TableSource for JsonTableSource<'_> {
    fn tables_for_page(&self, page: usize) -> std::result::Result<Vec<RawTable>, TableError> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(|p| p.tables.clone())
            .ok_or_else(|| TableError::new(page, "page out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, x0: f64, top: f64, x1: f64, bottom: f64) -> Word {
        Word {
            text: text.to_string(),
            x0,
            top,
            x1,
            bottom,
        }
    }

    const JSON: &str = r#"{
        "source": "규칙.pdf",
        "pages": [
            {"text": "제24조(안전모) 본문", "words": [
                {"text": "제24조(안전모)", "x0": 10, "top": 20, "x1": 60, "bottom": 30},
                {"text": "본문", "x0": 70, "top": 20, "x1": 90, "bottom": 30},
                {"text": "하단", "x0": 5, "top": 700, "x1": 40, "bottom": 710}
            ]},
            {"text": null, "tables": [[["구분", null], ["기계", "프레스"]]]}
        ]
    }"#;

    #[test]
    fn test_parse_layout_document() {
        let document = LayoutDocument::from_json_str(JSON).unwrap();
        assert_eq!(document.source.as_deref(), Some("규칙.pdf"));
        assert_eq!(document.pages.len(), 2);
        assert_eq!(document.pages[1].text(), "");
        assert!(document.words(2).is_empty());
        assert!(document.words(0).is_empty());
    }

    #[test]
    fn test_words_bbox_is_union() {
        let words = vec![word("a", 10.0, 20.0, 60.0, 30.0), word("b", 5.0, 25.0, 90.0, 40.0)];
        assert_eq!(words_bbox(&words), Some([5.0, 20.0, 90.0, 40.0]));
        assert_eq!(words_bbox(&[]), None);
    }

    #[test]
    fn test_article_bbox_prefers_number_words() {
        let document = LayoutDocument::from_json_str(JSON).unwrap();
        assert_eq!(
            document.article_bbox(1, "제24조"),
            Some([10.0, 20.0, 60.0, 30.0])
        );
        assert_eq!(
            document.article_bbox(1, "제99조"),
            Some([5.0, 20.0, 90.0, 710.0])
        );
        assert_eq!(document.article_bbox(2, "제24조"), None);
    }

    #[test]
    fn test_json_table_source() {
        let document = LayoutDocument::from_json_str(JSON).unwrap();
        let source = document.table_source();
        assert!(source.tables_for_page(1).unwrap().is_empty());
        assert_eq!(source.tables_for_page(2).unwrap()[0][1][1].as_deref(), Some("프레스"));
        assert!(source.tables_for_page(3).is_err());
    }

    #[test]
    fn test_from_path_derives_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("산업안전보건기준에 관한 규칙.json");
        std::fs::write(&path, r#"{"pages": []}"#).unwrap();

        let document = LayoutDocument::from_path(&path).unwrap();
        assert_eq!(
            document.source.as_deref(),
            Some("산업안전보건기준에 관한 규칙.pdf")
        );
    }
}
