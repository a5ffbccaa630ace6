//! Text normalization for extracted statute text.
//!
//! Two passes:
//! - [`Normalizer::normalize_document`] cleans raw page text and re-anchors
//!   hierarchy markers (①, "1. ", "가. ") to line starts so the structural
//!   parser can split on them.
//! - [`Normalizer::normalize_node`] flattens a parsed node's text onto one
//!   line and applies the word-break repair table. It must run after
//!   splitting, because it removes the marker-forced line breaks.
//!
//! Both passes are idempotent.

mod rules;

use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::config::DEFAULT_RUNNING_TITLES;

pub use rules::{RepairRules, RuleSpec, RuleTableSpec, BUILTIN_RULES_VERSION};

/// Page footer of the national law information center PDFs.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FOOTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"법제처\s+[^\n]*국가법령정보센터").expect("valid regex"));

/// Bare page number lines ("12", "- 12 -").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_NUMBER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-\s*)?\d{1,4}(?:\s*-)?$").expect("valid regex"));

/// Circled paragraph numeral, with any whitespace in front of it.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARAGRAPH_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([①-⑳])").expect("valid regex"));

/// Item marker "N. " preceded by whitespace, with the token before it.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S*)\s+(\d{1,2}\.\s)").expect("valid regex"));

/// Token ending like a date component ("2020.", "12.").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\.$").expect("valid regex"));

/// Subitem marker "가. " preceded by whitespace.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUBITEM_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+([가나다라마바사아자차카타파하]\.\s)").expect("valid regex")
});

/// Horizontal whitespace runs within a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));

/// Any whitespace run, newlines included.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANY_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Statute text normalizer.
///
/// Holds the corpus-specific parts (running page titles and the repair
/// table); everything else is fixed.
#[derive(Debug, Clone)]
pub struct Normalizer {
    running_titles: Vec<String>,
    rules: RepairRules,
}

impl Normalizer {
    /// Create a normalizer.
    #[must_use]
    pub fn new(
        running_titles: impl IntoIterator<Item = impl Into<String>>,
        rules: RepairRules,
    ) -> Self {
        Self {
            running_titles: running_titles.into_iter().map(Into::into).collect(),
            rules,
        }
    }

    /// Replace the repair table.
    #[must_use]
    pub fn with_rules(mut self, rules: RepairRules) -> Self {
        self.rules = rules;
        self
    }

    /// The active repair table.
    #[must_use]
    pub fn rules(&self) -> &RepairRules {
        &self.rules
    }

    /// Clean raw page text and put every hierarchy marker on its own line.
    pub fn normalize_document(&self, text: &str) -> String {
        let text: String = text.nfc().collect();
        let text = FOOTER_PATTERN.replace_all(&text, "");
        let text = PARAGRAPH_MARKER.replace_all(&text, "\n$1");
        let text = ITEM_MARKER.replace_all(&text, |caps: &Captures<'_>| {
            // "2020. 1. 1." continues a date
            if DATE_PART.is_match(&caps[1]) {
                caps[0].to_string()
            } else {
                format!("{}\n{}", &caps[1], &caps[2])
            }
        });
        let text = SUBITEM_MARKER.replace_all(&text, "\n$1");

        text.lines()
            .map(|line| INLINE_WHITESPACE.replace_all(line, " ").trim().to_string())
            .filter(|line| !line.is_empty())
            .filter(|line| !PAGE_NUMBER_LINE.is_match(line))
            .filter(|line| !self.is_running_title(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Flatten node text onto a single line and repair word breaks.
    pub fn normalize_node(&self, text: &str) -> String {
        let flat = ANY_WHITESPACE.replace_all(text, " ");
        let repaired = self.rules.apply(flat.trim());
        ANY_WHITESPACE
            .replace_all(&repaired, " ")
            .trim()
            .to_string()
    }

    fn is_running_title(&self, line: &str) -> bool {
        self.running_titles.iter().any(|t| t == line)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_RUNNING_TITLES, RepairRules::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removes_footer_and_page_numbers() {
        let raw = "제1조(목적) 이 규칙은 목적으로 한다.\n  12  \n법제처   3   국가법령정보센터\n- 4 -\n제2조(정의) 용어의 뜻은 다음과 같다.";
        let normalized = Normalizer::default().normalize_document(raw);
        assert_eq!(
            normalized,
            "제1조(목적) 이 규칙은 목적으로 한다.\n제2조(정의) 용어의 뜻은 다음과 같다."
        );
    }

    #[test]
    fn test_removes_running_titles() {
        let raw = "산업안전보건기준에 관한 규칙\n제3조(전도의 방지) 사업주는 넘어지지 않도록 한다.";
        let normalized = Normalizer::default().normalize_document(raw);
        assert_eq!(normalized, "제3조(전도의 방지) 사업주는 넘어지지 않도록 한다.");
    }

    #[test]
    fn test_markers_start_lines() {
        let raw = "제24조(안전모) 사업주는 ... ①근로자는 착용하여야 한다. 1. 추락 장소 2. 낙하 장소 가. 높은 곳 나. 낮은 곳";
        let normalized = Normalizer::default().normalize_document(raw);
        assert_eq!(
            normalized,
            "제24조(안전모) 사업주는 ...\n①근로자는 착용하여야 한다.\n1. 추락 장소\n2. 낙하 장소\n가. 높은 곳\n나. 낮은 곳"
        );
    }

    #[test]
    fn test_dates_in_running_text_stay_inline() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.normalize_document("이 규칙은 2020. 1. 1.부터 시행한다."),
            "이 규칙은 2020. 1. 1.부터 시행한다."
        );
        assert_eq!(
            normalizer.normalize_document("2019. 12. 26. 이후 설치한 설비 1. 프레스"),
            "2019. 12. 26. 이후 설치한 설비\n1. 프레스"
        );
    }

    #[test]
    fn test_item_marker_after_bracket_note() {
        let raw = "점검하여야 한다. [본조신설 2017. 3. 3.] 1. 매일 점검";
        assert_eq!(
            Normalizer::default().normalize_document(raw),
            "점검하여야 한다. [본조신설 2017. 3. 3.]\n1. 매일 점검"
        );
    }

    #[test]
    fn test_sentence_final_da_is_not_a_marker() {
        let raw = "한다. 다음 각 호와 같다.";
        let normalized = Normalizer::default().normalize_document(raw);
        assert_eq!(normalized, "한다. 다음 각 호와 같다.");
    }

    #[test]
    fn test_collapses_whitespace_and_blank_lines() {
        let raw = "가나   다\t라\n\n\n\n마  바";
        let normalized = Normalizer::default().normalize_document(raw);
        assert_eq!(normalized, "가나 다 라\n마 바");
    }

    #[test]
    fn test_composes_decomposed_hangul() {
        // "한" as conjoining jamo
        let decomposed = "\u{1112}\u{1161}\u{11AB}다";
        assert_eq!(Normalizer::default().normalize_document(decomposed), "한다");
    }

    #[test]
    fn test_document_pass_is_idempotent() {
        let normalizer = Normalizer::default();
        let raw = "산업안전보건기준에 관한 규칙\n제24조(안전모)  사업주는 ①근로자는 1. 추락 2. 낙하 가. 높은 곳\n 7 \n②사업주는 <개정 2019. 12. 26.> 설치하 여야 한다.";
        let once = normalizer.normalize_document(raw);
        let twice = normalizer.normalize_document(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_node_pass_flattens_and_repairs() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.normalize_node("  근로자는 안전모를\n착용하 여야   한 다. "),
            "근로자는 안전모를 착용하여야 한다."
        );
    }

    #[test]
    fn test_node_pass_is_idempotent() {
        let normalizer = Normalizer::default();
        let once = normalizer.normalize_node("가 다 다\n넘어지지 않 도록 하 여야");
        assert_eq!(normalizer.normalize_node(&once), once);
    }

    #[test]
    fn test_custom_rules() {
        let rules = RepairRules::compile(RuleTableSpec {
            version: "test".to_string(),
            rules: vec![RuleSpec::new("보 호", "보호")],
        })
        .unwrap();
        let normalizer = Normalizer::default().with_rules(rules);
        assert_eq!(normalizer.rules().version(), "test");
        assert_eq!(normalizer.normalize_node("보 호 조치"), "보호 조치");
    }
}
