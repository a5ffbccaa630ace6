//! Structure parser that splits normalized statute text into articles.

use std::sync::LazyLock;

use regex::Regex;

use super::headings::{take_headings, HeadingContext};
use super::marker::split_on_marker;
use super::registry::HierarchyRegistry;
use super::types::{ArticleHeading, Level, LocatedArticle, Split};
use crate::amendment::strip_annotations;
use crate::config::{PipelineConfig, DEFAULT_MIN_ARTICLE_BODY_CHARS, LEAD_PARAGRAPH};
use crate::normalize::Normalizer;
use crate::types::{Article, Item, Paragraph, Subitem};

/// Law title: everything up to the last 규칙/시행령/법률/법 of the line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LAW_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*(?:규칙|시행령|법률|법))").expect("valid regex"));

/// Marker of the first part heading; the law title precedes it.
const FIRST_PART: &str = "제1편";

/// Characters searched for the law title when there is no part heading.
const LAW_NAME_WINDOW: usize = 1000;

/// Parser for the article → paragraph → item → subitem hierarchy.
///
/// Expects text from [`Normalizer::normalize_document`], where every
/// marker starts a line.
#[derive(Debug, Clone)]
pub struct StructureParser {
    hierarchy: HierarchyRegistry,
    normalizer: Normalizer,
    min_article_body_chars: usize,
}

impl StructureParser {
    /// Create a new parser.
    #[must_use]
    pub fn new(hierarchy: HierarchyRegistry, normalizer: Normalizer) -> Self {
        Self {
            hierarchy,
            normalizer,
            min_article_body_chars: DEFAULT_MIN_ARTICLE_BODY_CHARS,
        }
    }

    /// Create a parser for the statute hierarchy from pipeline settings.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(super::create_statute_hierarchy(), config.normalizer.clone())
            .with_min_article_body_chars(config.min_article_body_chars)
    }

    /// Set the minimum article body length.
    #[must_use]
    pub fn with_min_article_body_chars(mut self, chars: usize) -> Self {
        self.min_article_body_chars = chars;
        self
    }

    /// Split a normalized document into articles, in document order.
    ///
    /// Headings are threaded through the fold: each article gets the
    /// context built from the headings before it, and the headings that
    /// trail its body apply to the articles after it.
    pub fn parse(&self, text: &str) -> Vec<LocatedArticle> {
        let Some(spec) = self.hierarchy.get_spec(Level::Article) else {
            tracing::warn!("No article level in splitting hierarchy, nothing to parse");
            return Vec::new();
        };

        let split = split_on_marker(text, &spec.marker, ArticleHeading::from_captures);
        let (_, leading) = take_headings(split.intro);
        let initial = HeadingContext::default().apply_all(&leading);

        let (_, articles) = split.segments.into_iter().fold(
            (initial, Vec::new()),
            |(context, mut articles), segment| {
                let (body, headings) = take_headings(segment.body);
                if let Some(mut article) = self.parse_article(&segment.label, &body) {
                    context.stamp(&mut article);
                    articles.push(LocatedArticle {
                        article,
                        offset: segment.offset,
                    });
                }
                (context.apply_all(&headings), articles)
            },
        );

        tracing::debug!(articles = articles.len(), "Parsed articles");
        articles
    }

    fn parse_article(&self, heading: &ArticleHeading, body: &str) -> Option<Article> {
        let chars = self.normalizer.normalize_node(body).chars().count();
        if chars < self.min_article_body_chars {
            tracing::debug!(
                article = %heading.number,
                chars,
                "Skipping article block with short body"
            );
            return None;
        }

        Some(
            Article::new(&heading.number, &heading.title)
                .with_paragraphs(self.parse_paragraphs(body)),
        )
    }

    /// Split an article body into paragraphs.
    ///
    /// Text before the first circled numeral becomes the "본문" paragraph,
    /// omitted when it carries nothing.
    pub fn parse_paragraphs(&self, body: &str) -> Vec<Paragraph> {
        let split = self.split_level(Level::Paragraph, body);

        let lead = self.parse_paragraph(LEAD_PARAGRAPH, split.intro);
        let lead = (!is_blank(&lead)).then_some(lead);

        lead.into_iter()
            .chain(
                split
                    .segments
                    .iter()
                    .map(|segment| self.parse_paragraph(&segment.label, segment.body)),
            )
            .collect()
    }

    fn parse_paragraph(&self, number: &str, raw: &str) -> Paragraph {
        // Annotations go first so digits inside them never look like items
        let annotations = strip_annotations(raw);
        let (text, items) = self.parse_items(&annotations.text);

        let mut paragraph = Paragraph::new(number, text).with_items(items);
        paragraph.annotations = annotations.notes;
        paragraph.amendments = annotations.amendments;
        paragraph
    }

    fn parse_items(&self, text: &str) -> (String, Vec<Item>) {
        let split = self.split_level(Level::Item, text);
        let items = split
            .segments
            .iter()
            .map(|segment| {
                let (text, subitems) = self.parse_subitems(segment.body);
                Item::new(&segment.label, text).with_subitems(subitems)
            })
            .collect();
        (self.normalizer.normalize_node(split.intro), items)
    }

    fn parse_subitems(&self, text: &str) -> (String, Vec<Subitem>) {
        let split = self.split_level(Level::Subitem, text);
        let subitems = split
            .segments
            .iter()
            .map(|segment| {
                Subitem::new(&segment.label, self.normalizer.normalize_node(segment.body))
            })
            .collect();
        (self.normalizer.normalize_node(split.intro), subitems)
    }

    fn split_level<'a>(&self, level: Level, text: &'a str) -> Split<'a, String> {
        match self.hierarchy.get_spec(level) {
            Some(spec) => spec.split(text),
            None => Split {
                intro: text,
                segments: Vec::new(),
            },
        }
    }
}

impl Default for StructureParser {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

fn is_blank(paragraph: &Paragraph) -> bool {
    paragraph.text.is_empty()
        && paragraph.items.is_empty()
        && paragraph.annotations.is_empty()
        && paragraph.amendments.is_empty()
}

/// Read the law name from the top of a document.
///
/// Looks at the first non-empty line before "제1편" (or within the first
/// 1000 characters), ignoring bracketed trailers such as "[시행 ...]".
///
/// # Examples
/// ```
/// use lawchunk_ingest::splitting::extract_law_name;
///
/// let text = "산업안전보건기준에 관한 규칙 [시행 2024. 1. 1.]\n제1편 총칙";
/// assert_eq!(
///     extract_law_name(text).as_deref(),
///     Some("산업안전보건기준에 관한 규칙")
/// );
/// ```
#[must_use]
pub fn extract_law_name(text: &str) -> Option<String> {
    let head = match text.find(FIRST_PART) {
        Some(end) => &text[..end],
        None => match text.char_indices().nth(LAW_NAME_WINDOW) {
            Some((end, _)) => &text[..end],
            None => text,
        },
    };

    let line = head
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.contains("국가법령정보센터"))?;
    let title = line
        .split(&['[', '<', '('][..])
        .next()
        .unwrap_or(line)
        .trim();

    LAW_NAME
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
