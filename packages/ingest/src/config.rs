//! Configuration constants and validation functions for ingestion.

use crate::error::{IngestError, Result};
use crate::normalize::Normalizer;

/// Default token budget per chunk.
///
/// Matches the window used for the embedding collection downstream.
pub const DEFAULT_MAX_TOKENS: usize = 800;

/// Minimum body length (in characters) for an article block to be kept.
///
/// Shorter blocks are almost always stray cross-references such as
/// "제5조(정의)에" that happen to match the article header pattern.
pub const DEFAULT_MIN_ARTICLE_BODY_CHARS: usize = 10;

/// Sentinel paragraph number for lead text that precedes the first ①.
pub const LEAD_PARAGRAPH: &str = "본문";

/// Ordered subitem (목) alphabet.
pub const SUBITEM_LETTERS: [char; 14] = [
    '가', '나', '다', '라', '마', '바', '사', '아', '자', '차', '카', '타', '파', '하',
];

/// Circled paragraph numerals ① through ⑳, in order.
pub const CIRCLED_NUMERALS: [char; 20] = [
    '①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩', '⑪', '⑫', '⑬', '⑭', '⑮', '⑯', '⑰',
    '⑱', '⑲', '⑳',
];

/// Running law titles printed at the top of every page of the national
/// law information center PDFs.
pub const DEFAULT_RUNNING_TITLES: [&str; 6] = [
    "산업안전보건기준에 관한 규칙",
    "산업안전보건법 시행규칙",
    "재난 및 안전관리 기본법 시행령",
    "재난 및 안전관리 기본법",
    "중대재해 처벌 등에 관한 법률 시행령",
    "중대재해 처벌 등에 관한 법률",
];

/// Map a circled numeral to its decimal string ("①" → "1").
///
/// # Examples
/// ```
/// use lawchunk_ingest::config::circled_to_decimal;
///
/// assert_eq!(circled_to_decimal('①'), Some("1".to_string()));
/// assert_eq!(circled_to_decimal('⑳'), Some("20".to_string()));
/// assert_eq!(circled_to_decimal('1'), None);
/// ```
#[must_use]
pub fn circled_to_decimal(c: char) -> Option<String> {
    CIRCLED_NUMERALS
        .iter()
        .position(|&n| n == c)
        .map(|i| (i + 1).to_string())
}

/// Replace every circled numeral in `text` with its decimal string.
#[must_use]
pub fn replace_circled(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match circled_to_decimal(c) {
            Some(n) => out.push_str(&n),
            None => out.push(c),
        }
    }
    out
}

/// Check whether `c` belongs to the subitem alphabet.
#[must_use]
pub fn is_subitem_letter(c: char) -> bool {
    SUBITEM_LETTERS.contains(&c)
}

/// Validate a chunk token budget.
///
/// # Examples
/// ```
/// use lawchunk_ingest::config::validate_max_tokens;
///
/// assert!(validate_max_tokens(800).is_ok());
/// assert!(validate_max_tokens(0).is_err());
/// ```
pub fn validate_max_tokens(max_tokens: usize) -> Result<()> {
    if max_tokens == 0 {
        return Err(IngestError::InvalidMaxTokens(max_tokens));
    }
    Ok(())
}

/// Settings for one document-processing run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Token budget per chunk.
    pub max_tokens: usize,

    /// Article blocks with a shorter body are dropped.
    pub min_article_body_chars: usize,

    /// Text normalizer (boilerplate patterns and word-break repairs).
    pub normalizer: Normalizer,
}

impl PipelineConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            min_article_body_chars: DEFAULT_MIN_ARTICLE_BODY_CHARS,
            normalizer: Normalizer::default(),
        }
    }

    /// Set the token budget.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Result<Self> {
        validate_max_tokens(max_tokens)?;
        self.max_tokens = max_tokens;
        Ok(self)
    }

    /// Set the minimum article body length.
    #[must_use]
    pub fn with_min_article_body_chars(mut self, chars: usize) -> Self {
        self.min_article_body_chars = chars;
        self
    }

    /// Replace the normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
