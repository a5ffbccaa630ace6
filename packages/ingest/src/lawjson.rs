//! Import of statute JSON from the national law information API.
//!
//! The expected shape is `{"법령": {"조문": {"조문단위": [...]}}}`. Units
//! marked `"조문여부": "조문"` are articles; units marked `"전문"` carry
//! 편/장/절/관 headings. Child collections (`항`, `호`, `목`) may be a single
//! object or a list.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::{is_subitem_letter, replace_circled, LEAD_PARAGRAPH};
use crate::error::{IngestError, Result};
use crate::splitting::{Heading, HeadingContext};
use crate::types::{Article, Item, Paragraph, Subitem};

/// Suffix of files produced by the cleaning step.
const CLEAN_SUFFIX: &str = "_clean";

/// Unit kind of an article.
const ARTICLE_UNIT: &str = "조문";

/// Unit kind of a heading.
const HEADING_UNIT: &str = "전문";

/// Leading "1." or "1 " marker, after circled numerals were replaced.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUMBER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:\.\s*|\s+)").expect("valid regex"));

/// Leading "가." marker.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LETTER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\p{Hangul})\.\s*").expect("valid regex"));

/// Law name for a statute JSON file: the file stem without `_clean`.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use lawchunk_ingest::lawjson::law_name_from_path;
///
/// assert_eq!(law_name_from_path(Path::new("data/산업안전보건법_clean.json")), "산업안전보건법");
/// assert_eq!(law_name_from_path(Path::new("산업안전보건법.json")), "산업안전보건법");
/// ```
#[must_use]
pub fn law_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_suffix(CLEAN_SUFFIX)
        .map(String::from)
        .unwrap_or(stem)
}

/// Read statute JSON into articles.
///
/// Heading units update the 편/장/절/관 context of the articles after them.
/// Malformed nodes are skipped with a warning.
pub fn import_statute(value: &Value) -> Result<Vec<Article>> {
    let units = value
        .get("법령")
        .and_then(|law| law.get("조문"))
        .and_then(|articles| articles.get("조문단위"))
        .ok_or_else(|| IngestError::UnrecognizedStatute("법령.조문.조문단위".to_string()))?;

    let mut context = HeadingContext::default();
    let mut articles = Vec::new();

    for (index, unit) in as_list(Some(units)).into_iter().enumerate() {
        if !unit.is_object() {
            tracing::warn!(unit = index, "Skipping statute unit that is not an object");
            continue;
        }

        match unit.get("조문여부").and_then(Value::as_str) {
            Some(ARTICLE_UNIT) => {
                if let Some(mut article) = import_article(unit, index) {
                    context.stamp(&mut article);
                    articles.push(article);
                }
            }
            Some(HEADING_UNIT) => {
                match text_field(unit, "조문내용").as_deref().and_then(Heading::parse) {
                    Some(heading) => context = context.apply(&heading),
                    None => tracing::debug!(unit = index, "Heading unit without a heading line"),
                }
            }
            other => {
                tracing::debug!(unit = index, kind = ?other, "Skipping statute unit");
            }
        }
    }

    tracing::debug!(articles = articles.len(), "Imported statute JSON");
    Ok(articles)
}

fn import_article(unit: &Value, index: usize) -> Option<Article> {
    let Some(number) = text_field(unit, "조문번호") else {
        tracing::warn!(unit = index, "Skipping article without 조문번호");
        return None;
    };
    let number = match text_field(unit, "조문가지번호").filter(|b| !b.is_empty()) {
        Some(branch) => format!("제{number}조의{branch}"),
        None => format!("제{number}조"),
    };
    let title = text_field(unit, "조문제목").unwrap_or_default();
    let text = text_field(unit, "조문내용").unwrap_or_default();

    let paragraphs = as_list(unit.get("항"))
        .into_iter()
        .enumerate()
        .filter_map(|(i, node)| import_paragraph(node, i, &number))
        .collect();

    Some(
        Article::new(number, title)
            .with_text(text)
            .with_paragraphs(paragraphs),
    )
}

fn import_paragraph(node: &Value, position: usize, article: &str) -> Option<Paragraph> {
    let items: Vec<Item> = as_list(node.get("호"))
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| import_item(item, i, article))
        .collect();
    let text = node_text(node, "항내용", !items.is_empty(), article, "항")?;

    let (number, text) = split_number(
        text_field(node, "항번호"),
        &text,
        &NUMBER_MARKER,
        |_| true,
        || {
            if position == 0 {
                LEAD_PARAGRAPH.to_string()
            } else {
                (position + 1).to_string()
            }
        },
    );

    Some(Paragraph::new(number, text).with_items(items))
}

fn import_item(node: &Value, position: usize, article: &str) -> Option<Item> {
    let subitems: Vec<Subitem> = as_list(node.get("목"))
        .into_iter()
        .enumerate()
        .filter_map(|(i, subitem)| import_subitem(subitem, i, article))
        .collect();
    let text = node_text(node, "호내용", !subitems.is_empty(), article, "호")?;

    let (number, text) = split_number(
        text_field(node, "호번호"),
        &text,
        &NUMBER_MARKER,
        |_| true,
        || (position + 1).to_string(),
    );
    Some(Item::new(number, text).with_subitems(subitems))
}

fn import_subitem(node: &Value, position: usize, article: &str) -> Option<Subitem> {
    let text = node_text(node, "목내용", false, article, "목")?;

    let (letter, text) = split_number(
        text_field(node, "목번호"),
        &text,
        &LETTER_MARKER,
        |marker| marker.chars().next().is_some_and(is_subitem_letter),
        || {
            crate::config::SUBITEM_LETTERS
                .get(position)
                .map_or_else(|| (position + 1).to_string(), char::to_string)
        },
    );
    Some(Subitem::new(letter, text))
}

/// Text of a child node. Nodes that are not objects, or that carry neither
/// text nor children, are skipped.
fn node_text(
    node: &Value,
    field: &str,
    has_children: bool,
    article: &str,
    level: &str,
) -> Option<String> {
    if !node.is_object() {
        tracing::warn!(article = %article, level, "Skipping node that is not an object");
        return None;
    }
    match text_field(node, field) {
        Some(text) => Some(text),
        None if has_children => Some(String::new()),
        None => {
            tracing::warn!(article = %article, level, field, "Skipping node without text");
            None
        }
    }
}

/// Node number from its field, else from the leading marker of its text,
/// else from `fallback`. A leading marker is removed from the text when it
/// matches the number.
fn split_number(
    field: Option<String>,
    text: &str,
    marker: &Regex,
    accept: impl Fn(&str) -> bool,
    fallback: impl FnOnce() -> String,
) -> (String, String) {
    let field = field
        .map(|n| n.trim_end_matches('.').trim().to_string())
        .filter(|n| !n.is_empty());

    let leading = marker
        .captures(text)
        .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(0)?.end())))
        .filter(|(label, _)| accept(label));

    match (field, leading) {
        (Some(number), Some((label, end))) if label == number => {
            (number, text[end..].trim().to_string())
        }
        (Some(number), _) => (number, text.to_string()),
        (None, Some((label, end))) => (label.to_string(), text[end..].trim().to_string()),
        (None, None) => (fallback(), text.to_string()),
    }
}

/// A string field with circled numerals replaced. Numbers are accepted;
/// arrays of strings are joined line by line.
fn text_field(node: &Value, field: &str) -> Option<String> {
    let raw = match node.get(field)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    Some(replace_circled(&raw).trim().to_string())
}

/// A field that may hold one object or a list of them.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values.iter().collect(),
        Some(value) => vec![value],
    }
}
