//! Part/chapter/section/subsection headings and their carry-forward.
//!
//! Headings ("제2편 안전기준", "제1장 통칙") sit on their own line between
//! articles. They are removed from the article text and folded into a
//! [`HeadingContext`] that is stamped onto every following article until a
//! heading of the same or a higher level replaces it.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Article;

/// Heading line: "제N편|장|절|관" optionally followed by a title.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^제\s*(\d+)\s*(편|장|절|관)(?:\s+(\S.*))?$").expect("valid regex")
});

/// Heading level, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    /// 편.
    Part,
    /// 장.
    Chapter,
    /// 절.
    Section,
    /// 관.
    Subsection,
}

impl HeadingLevel {
    /// Parse from the Korean unit.
    #[must_use]
    pub fn from_unit(unit: &str) -> Option<Self> {
        match unit {
            "편" => Some(Self::Part),
            "장" => Some(Self::Chapter),
            "절" => Some(Self::Section),
            "관" => Some(Self::Subsection),
            _ => None,
        }
    }
}

/// A heading label at a known level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level.
    pub level: HeadingLevel,

    /// Full label, e.g. "제1장 총칙".
    pub label: String,
}

impl Heading {
    /// Parse a heading from a single trimmed line.
    ///
    /// # Examples
    /// ```
    /// use lawchunk_ingest::splitting::{Heading, HeadingLevel};
    ///
    /// let heading = Heading::parse("제1장  총칙").unwrap();
    /// assert_eq!(heading.level, HeadingLevel::Chapter);
    /// assert_eq!(heading.label, "제1장 총칙");
    /// assert!(Heading::parse("제2장에 따른 조치").is_none());
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADING_LINE.captures(line.trim())?;
        let level = HeadingLevel::from_unit(&caps[2])?;
        let label = match caps.get(3) {
            Some(title) => format!(
                "제{}{} {}",
                &caps[1],
                &caps[2],
                title.as_str().split_whitespace().collect::<Vec<_>>().join(" ")
            ),
            None => format!("제{}{}", &caps[1], &caps[2]),
        };
        Some(Self { level, label })
    }
}

/// Remove heading lines from `text`.
///
/// Returns the remaining text and the headings in order.
#[must_use]
pub fn take_headings(text: &str) -> (String, Vec<Heading>) {
    let mut headings = Vec::new();
    let mut kept = Vec::new();
    for line in text.lines() {
        match Heading::parse(line) {
            Some(heading) => headings.push(heading),
            None => kept.push(line),
        }
    }
    (kept.join("\n"), headings)
}

/// Heading labels in force at a point of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingContext {
    /// 편 label.
    pub part: Option<String>,

    /// 장 label.
    pub chapter: Option<String>,

    /// 절 label.
    pub section: Option<String>,

    /// 관 label.
    pub subsection: Option<String>,
}

impl HeadingContext {
    /// Context after `heading`: sets its level and clears every lower one.
    #[must_use]
    pub fn apply(mut self, heading: &Heading) -> Self {
        let label = Some(heading.label.clone());
        match heading.level {
            HeadingLevel::Part => {
                self.part = label;
                self.chapter = None;
                self.section = None;
                self.subsection = None;
            }
            HeadingLevel::Chapter => {
                self.chapter = label;
                self.section = None;
                self.subsection = None;
            }
            HeadingLevel::Section => {
                self.section = label;
                self.subsection = None;
            }
            HeadingLevel::Subsection => {
                self.subsection = label;
            }
        }
        self
    }

    /// Context after all of `headings`, in order.
    #[must_use]
    pub fn apply_all<'a>(self, headings: impl IntoIterator<Item = &'a Heading>) -> Self {
        headings.into_iter().fold(self, Self::apply)
    }

    /// Copy the labels onto an article.
    pub fn stamp(&self, article: &mut Article) {
        article.part.clone_from(&self.part);
        article.chapter.clone_from(&self.chapter);
        article.section.clone_from(&self.section);
        article.subsection.clone_from(&self.subsection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn heading(line: &str) -> Heading {
        Heading::parse(line).unwrap()
    }

    #[test]
    fn test_parse_all_levels() {
        assert_eq!(heading("제2편 안전기준").level, HeadingLevel::Part);
        assert_eq!(heading("제 3 장 보호구").level, HeadingLevel::Chapter);
        assert_eq!(heading("제1절 통칙").level, HeadingLevel::Section);
        assert_eq!(heading("제2관 설치").level, HeadingLevel::Subsection);
        assert_eq!(heading("제4장").label, "제4장");
    }

    #[test]
    fn test_body_lines_are_not_headings() {
        assert!(Heading::parse("제2장에 따른 조치를 하여야 한다.").is_none());
        assert!(Heading::parse("사업주는 제1편 총칙을 따른다").is_none());
    }

    #[test]
    fn test_take_headings() {
        let (text, headings) = take_headings("사업주는 설치하여야 한다.\n제2장 보호구\n제1절 통칙");
        assert_eq!(text, "사업주는 설치하여야 한다.");
        assert_eq!(
            headings.iter().map(|h| h.label.as_str()).collect::<Vec<_>>(),
            vec!["제2장 보호구", "제1절 통칙"]
        );
    }

    #[test]
    fn test_higher_level_clears_lower() {
        let context = HeadingContext::default().apply_all(&[
            heading("제1편 총칙"),
            heading("제1장 통칙"),
            heading("제1절 정의"),
            heading("제1관 용어"),
        ]);
        assert_eq!(context.subsection.as_deref(), Some("제1관 용어"));

        let context = context.apply(&heading("제2장 안전조치"));
        assert_eq!(context.part.as_deref(), Some("제1편 총칙"));
        assert_eq!(context.chapter.as_deref(), Some("제2장 안전조치"));
        assert_eq!(context.section, None);
        assert_eq!(context.subsection, None);
    }

    #[test]
    fn test_stamp() {
        let context = HeadingContext::default().apply(&heading("제3장 보호구"));
        let mut article = Article::new("제24조", "안전모");
        context.stamp(&mut article);
        assert_eq!(article.chapter.as_deref(), Some("제3장 보호구"));
        assert_eq!(article.part, None);
    }
}
