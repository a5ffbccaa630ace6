//! Configuration for the Korean statute hierarchy.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::registry::HierarchyRegistry;
use super::types::{Level, LevelSpec};
use crate::config::{circled_to_decimal, is_subitem_letter};

/// Article header at a line start: "제24조(안전모)", "제24조의2(안전대)".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*제\s*(\d+)\s*조(?:\s*의\s*(\d+))?\s*\(([^\n]+?)\)").expect("valid regex")
});

/// Circled paragraph numeral.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARAGRAPH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([①-⑳])\s*").expect("valid regex"));

/// Item marker at a line start.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*(\d{1,2})\.\s").expect("valid regex"));

/// Subitem marker candidate at a line start. The alphabet is checked by
/// the label function.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUBITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*(\p{Hangul})\.\s").expect("valid regex"));

/// Create the hierarchy registry for Korean statutes.
///
/// ```text
/// 조  제24조(안전모)
/// └── 항  ① ... ⑳
///     └── 호  1. ... 99.
///         └── 목  가. ... 하.
/// ```
#[must_use]
pub fn create_statute_hierarchy() -> HierarchyRegistry {
    let mut registry = HierarchyRegistry::new();

    // Article: labelled with the canonical number; the engine reads the
    // title from the same match.
    registry.register(
        LevelSpec::new(Level::Article, ARTICLE_MARKER.clone()).with_label(article_label),
    );

    registry.register(
        LevelSpec::new(Level::Paragraph, PARAGRAPH_MARKER.clone()).with_label(paragraph_label),
    );

    registry.register(LevelSpec::new(Level::Item, ITEM_MARKER.clone()).with_label(item_label));

    registry.register(
        LevelSpec::new(Level::Subitem, SUBITEM_MARKER.clone()).with_label(subitem_label),
    );

    registry
}

fn article_label(caps: &Captures<'_>) -> Option<String> {
    let number = caps.get(1)?.as_str();
    Some(match caps.get(2) {
        Some(branch) => format!("제{number}조의{}", branch.as_str()),
        None => format!("제{number}조"),
    })
}

fn paragraph_label(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)?.as_str().chars().next().and_then(circled_to_decimal)
}

fn item_label(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)?
        .as_str()
        .parse::<u8>()
        .ok()
        .filter(|n| (1..=99).contains(n))
        .map(|n| n.to_string())
}

fn subitem_label(caps: &Captures<'_>) -> Option<String> {
    let letter = caps.get(1)?.as_str().chars().next()?;
    is_subitem_letter(letter).then(|| letter.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(level: Level, text: &str) -> Vec<String> {
        let registry = create_statute_hierarchy();
        registry
            .get_spec(level)
            .unwrap()
            .split(text)
            .segments
            .into_iter()
            .map(|s| s.label)
            .collect()
    }

    #[test]
    fn test_create_statute_hierarchy() {
        let registry = create_statute_hierarchy();
        for level in [Level::Article, Level::Paragraph, Level::Item, Level::Subitem] {
            assert!(registry.get_spec(level).is_some());
        }
    }

    #[test]
    fn test_article_labels() {
        let text = "제1조(목적) 목적\n제24조의2(안전대) 설치\n제5조(정의)에 따른";
        assert_eq!(labels(Level::Article, text), vec!["제1조", "제24조의2", "제5조"]);
    }

    #[test]
    fn test_article_marker_requires_line_start() {
        assert!(labels(Level::Article, "이 규칙 제5조(정의)에 따른 용어").is_empty());
    }

    #[test]
    fn test_paragraph_labels_are_decimal() {
        assert_eq!(labels(Level::Paragraph, "①가\n②나\n⑳다"), vec!["1", "2", "20"]);
    }

    #[test]
    fn test_item_labels_drop_zero() {
        assert_eq!(labels(Level::Item, "1. 가\n0. 나\n12. 다"), vec!["1", "12"]);
    }

    #[test]
    fn test_subitem_labels_restricted_to_alphabet() {
        assert_eq!(
            labels(Level::Subitem, "가. 하나\n거. 아님\n나. 둘\n하. 끝"),
            vec!["가", "나", "하"]
        );
    }
}
