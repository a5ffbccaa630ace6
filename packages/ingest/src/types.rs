//! Core data types for parsed statutes.
//!
//! These types mirror the hierarchy of Korean legislation: 조 (article),
//! 항 (paragraph), 호 (item), 목 (subitem), plus 별표 (annex). Field names
//! follow the JSON contract consumed by the indexer.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::config::LEAD_PARAGRAPH;

/// Bounding box `[x0, top, x1, bottom]` in PDF points.
pub type BoundingBox = [f64; 4];

/// Kind of amendment recorded in a `<...>` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmendmentKind {
    /// Revised (개정).
    #[serde(rename = "개정")]
    Revised,

    /// Newly inserted (신설).
    #[serde(rename = "신설")]
    Inserted,

    /// Deleted (삭제).
    #[serde(rename = "삭제")]
    Deleted,

    /// Revised by another act (타법개정).
    #[serde(rename = "타법개정")]
    RevisedByOtherAct,
}

impl AmendmentKind {
    /// Get the Korean label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revised => "개정",
            Self::Inserted => "신설",
            Self::Deleted => "삭제",
            Self::RevisedByOtherAct => "타법개정",
        }
    }

    /// Parse from the Korean label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "개정" => Some(Self::Revised),
            "신설" => Some(Self::Inserted),
            "삭제" => Some(Self::Deleted),
            "타법개정" => Some(Self::RevisedByOtherAct),
            _ => None,
        }
    }
}

/// One amendment record: a kind and a single "YYYY.M.D" date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmendmentTag {
    /// Amendment kind.
    #[serde(rename = "type")]
    pub kind: AmendmentKind,

    /// Date as "YYYY.M.D".
    pub date: String,
}

impl AmendmentTag {
    /// Create a new amendment tag.
    #[must_use]
    pub fn new(kind: AmendmentKind, date: impl Into<String>) -> Self {
        Self {
            kind,
            date: date.into(),
        }
    }

    /// Parse the date, if it is a real calendar date.
    ///
    /// # Examples
    /// ```
    /// use lawchunk_ingest::types::{AmendmentKind, AmendmentTag};
    ///
    /// let tag = AmendmentTag::new(AmendmentKind::Revised, "2021.3.15");
    /// assert!(tag.naive_date().is_some());
    /// assert!(AmendmentTag::new(AmendmentKind::Revised, "2021.2.30").naive_date().is_none());
    /// ```
    #[must_use]
    pub fn naive_date(&self) -> Option<NaiveDate> {
        parse_change_date(&self.date)
    }
}

/// Parse a "YYYY.M.D" change date.
#[must_use]
pub fn parse_change_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y.%m.%d").ok()
}

/// A subitem (목), lettered 가 through 하.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subitem {
    /// Letter from the 14-symbol alphabet.
    #[serde(rename = "subitem_number")]
    pub letter: String,

    /// Body text.
    pub text: String,
}

impl Subitem {
    /// Create a new subitem.
    #[must_use]
    pub fn new(letter: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            letter: letter.into(),
            text: text.into(),
        }
    }
}

/// An item (호), numbered 1 through 99.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Decimal item number.
    #[serde(rename = "item_number")]
    pub number: String,

    /// Body text (intro text when subitems follow).
    pub text: String,

    /// Subitems in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subitems: Vec<Subitem>,
}

impl Item {
    /// Create a new item without subitems.
    #[must_use]
    pub fn new(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            text: text.into(),
            subitems: Vec::new(),
        }
    }

    /// Set the subitems.
    #[must_use]
    pub fn with_subitems(mut self, subitems: Vec<Subitem>) -> Self {
        self.subitems = subitems;
        self
    }
}

/// A paragraph (항).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Decimal paragraph number, or "본문" for untagged lead text.
    #[serde(rename = "paragraph_number")]
    pub number: String,

    /// Body text (intro text when items follow).
    pub text: String,

    /// Items in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,

    /// Bracketed notes that are not amendment tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,

    /// Amendment tags found while building the tree.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub amendments: Vec<AmendmentTag>,
}

impl Paragraph {
    /// Create a new paragraph.
    #[must_use]
    pub fn new(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            text: text.into(),
            items: Vec::new(),
            annotations: Vec::new(),
            amendments: Vec::new(),
        }
    }

    /// Create the synthetic lead paragraph.
    #[must_use]
    pub fn lead(text: impl Into<String>) -> Self {
        Self::new(LEAD_PARAGRAPH, text)
    }

    /// Whether this is the synthetic lead paragraph.
    #[must_use]
    pub fn is_lead(&self) -> bool {
        self.number == LEAD_PARAGRAPH
    }

    /// Set the items.
    #[must_use]
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }
}

/// A single article (조) with its hierarchy context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Article number, e.g. "제24조" or "제24조의2".
    #[serde(rename = "article_number")]
    pub number: String,

    /// Article title, e.g. "안전모".
    #[serde(rename = "article_title")]
    pub title: String,

    /// Part heading (편).
    pub part: Option<String>,

    /// Chapter heading (장).
    pub chapter: Option<String>,

    /// Section heading (절).
    pub section: Option<String>,

    /// Subsection heading (관).
    pub subsection: Option<String>,

    /// Article-level lead text. Only statute JSON input carries it; PDF
    /// input puts lead text in the "본문" paragraph.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,

    /// 1-based page the article header starts on.
    pub page_number: Option<usize>,

    /// Bounding box of the article header on that page.
    pub bbox: Option<BoundingBox>,

    /// Source document identifier.
    #[serde(rename = "source_pdf")]
    pub source: Option<String>,

    /// Law name.
    pub law_name: Option<String>,
}

impl Article {
    /// Create a new article.
    #[must_use]
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            part: None,
            chapter: None,
            section: None,
            subsection: None,
            text: String::new(),
            paragraphs: Vec::new(),
            page_number: None,
            bbox: None,
            source: None,
            law_name: None,
        }
    }

    /// Set the paragraphs.
    #[must_use]
    pub fn with_paragraphs(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.paragraphs = paragraphs;
        self
    }

    /// Set the article-level lead text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// "제24조 안전모" style header line.
    #[must_use]
    pub fn header(&self) -> String {
        format!("{} {}", self.number, self.title).trim().to_string()
    }
}

/// One table row, keyed by column header, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRecord {
    fields: Vec<(String, String)>,
}

impl TableRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. A repeated header overwrites the earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key, value));
        }
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for TableRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A numbered appendix (별표).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annex {
    /// "별표 N".
    pub annex_number: String,

    /// Best-effort title.
    pub title: Option<String>,

    /// Back-reference such as "제145조제1항".
    pub related_article: Option<String>,

    /// Table rows, when a table was recovered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub table: Vec<TableRecord>,

    /// One flattened line per table row, for direct indexing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embed_text_rows: Vec<String>,

    /// Raw block text.
    pub content: String,

    /// 1-based pages the block spans.
    pub page_numbers: Vec<usize>,

    /// Word bounding box per spanned page.
    pub bboxes: Vec<Option<BoundingBox>>,

    /// Law name.
    pub law_name: Option<String>,

    /// Source document identifier.
    #[serde(rename = "source_pdf")]
    pub source: Option<String>,
}
