//! Types for the structural splitting system.

use regex::{Captures, Regex};

use crate::types::Article;

/// Level of the statute hierarchy that is split on a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// 조, "제N조(의M)(제목)".
    Article,
    /// 항, circled numerals ① to ⑳.
    Paragraph,
    /// 호, "N. ".
    Item,
    /// 목, "가. ".
    Subitem,
}

/// Turns a marker match into a label, or rejects it as a boundary.
pub type LabelFn = fn(&Captures<'_>) -> Option<String>;

/// Declarative specification of one hierarchy level.
#[derive(Debug, Clone)]
pub struct LevelSpec {
    /// Level this spec describes.
    pub level: Level,

    /// Marker pattern. Each accepted match opens a new segment.
    pub marker: Regex,

    /// Label formatter and boundary filter.
    pub label: LabelFn,
}

impl LevelSpec {
    /// Create a spec that labels segments with the first capture group.
    #[must_use]
    pub fn new(level: Level, marker: Regex) -> Self {
        Self {
            level,
            marker,
            label: first_group,
        }
    }

    /// Set the label formatter.
    #[must_use]
    pub fn with_label(mut self, label: LabelFn) -> Self {
        self.label = label;
        self
    }

    /// Split `text` on this level's marker.
    #[must_use]
    pub fn split<'a>(&self, text: &'a str) -> Split<'a, String> {
        super::marker::split_on_marker(text, &self.marker, self.label)
    }
}

fn first_group(caps: &Captures<'_>) -> Option<String> {
    caps.get(1).map(|m| m.as_str().to_string())
}

/// One marker-delimited segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a, L> {
    /// Label produced for the marker.
    pub label: L,

    /// Byte offset of the marker in the split text.
    pub offset: usize,

    /// Text between this marker and the next accepted one.
    pub body: &'a str,
}

/// Result of splitting a text on one level's marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<'a, L> {
    /// Text before the first accepted marker.
    pub intro: &'a str,

    /// Segments in document order.
    pub segments: Vec<Segment<'a, L>>,
}

impl<L> Split<'_, L> {
    /// Whether no marker was accepted at this level.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Number and title read from an article header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleHeading {
    /// "제24조" or "제24조의2".
    pub number: String,

    /// Title between the parentheses.
    pub title: String,
}

impl ArticleHeading {
    /// Read a heading from an article marker match.
    ///
    /// Expects capture groups (number, branch number, title).
    #[must_use]
    pub fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let number = caps.get(1)?.as_str();
        let title = caps.get(3)?.as_str().trim();
        if title.is_empty() {
            return None;
        }
        let number = match caps.get(2) {
            Some(branch) => format!("제{number}조의{}", branch.as_str()),
            None => format!("제{number}조"),
        };
        Some(Self {
            number,
            title: title.to_string(),
        })
    }
}

/// An article together with the byte offset of its header in the
/// normalized document text.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedArticle {
    /// The parsed article.
    pub article: Article,

    /// Offset of the header.
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_spec_default_label() {
        let spec = LevelSpec::new(Level::Item, Regex::new(r"(?m)^(\d+)\.\s").unwrap());
        let split = spec.split("도입\n1. 가\n2. 나");
        assert_eq!(split.intro, "도입\n");
        let labels: Vec<_> = split.segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2"]);
    }

    #[test]
    fn test_article_heading_from_captures() {
        let re = Regex::new(r"제(\d+)조(?:의(\d+))?\((.*?)\)").unwrap();

        let caps = re.captures("제24조의2(안전모)").unwrap();
        let heading = ArticleHeading::from_captures(&caps).unwrap();
        assert_eq!(heading.number, "제24조의2");
        assert_eq!(heading.title, "안전모");

        let caps = re.captures("제3조( )").unwrap();
        assert!(ArticleHeading::from_captures(&caps).is_none());
    }
}
