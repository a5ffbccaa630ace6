//! Versioned word-break repair rules.
//!
//! PDF text extraction splits words at layout line ends ("하 여야",
//! "않 도록"). The repairs are corpus-specific, so they live in a table that
//! can be swapped for a JSON rule file instead of being hard-coded.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Upper bound on fixpoint iterations when applying the table.
const MAX_REPAIR_PASSES: usize = 8;

/// Version tag of the built-in table.
pub const BUILTIN_RULES_VERSION: &str = "v1";

/// Serialized form of a single repair rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Regular expression to match.
    pub pattern: String,

    /// Replacement, may reference capture groups as `${1}`.
    pub replacement: String,
}

impl RuleSpec {
    /// Create a new rule spec.
    #[must_use]
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Serialized form of a rule table, as read from a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTableSpec {
    /// Free-form version label, reported by the CLI and in logs.
    pub version: String,

    /// Rules, applied in order.
    pub rules: Vec<RuleSpec>,
}

impl RuleTableSpec {
    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_RULES_VERSION.to_string(),
            rules: vec![
                // Sentence-final "다" pushed onto its own word
                RuleSpec::new(r"(\w)\s+다\b", "${1}다"),
                RuleSpec::new("하 여야", "하여야"),
                RuleSpec::new("되 지", "되지"),
                RuleSpec::new("않 는", "않는"),
                RuleSpec::new("않 도록", "않도록"),
            ],
        }
    }
}

/// A compiled repair rule.
#[derive(Debug, Clone)]
struct RepairRule {
    pattern: Regex,
    replacement: String,
}

/// Compiled, versioned rule table.
#[derive(Debug, Clone)]
pub struct RepairRules {
    version: String,
    rules: Vec<RepairRule>,
}

impl RepairRules {
    /// Compile a rule table.
    pub fn compile(spec: RuleTableSpec) -> Result<Self> {
        let rules = spec
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| {
                let pattern =
                    Regex::new(&rule.pattern).map_err(|source| IngestError::InvalidRule {
                        index,
                        pattern: rule.pattern.clone(),
                        source,
                    })?;
                Ok(RepairRule {
                    pattern,
                    replacement: rule.replacement,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            version: spec.version,
            rules,
        })
    }

    /// The built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        // The built-in patterns are covered by tests; an empty table is the
        // only possible outcome of a compile failure here.
        Self::compile(RuleTableSpec::builtin()).unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in repair rules failed to compile");
            Self::empty()
        })
    }

    /// A table with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: "none".to_string(),
            rules: Vec::new(),
        }
    }

    /// Parse and compile a JSON rule table.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: RuleTableSpec = serde_json::from_str(json)?;
        Self::compile(spec)
    }

    /// Load and compile a JSON rule file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Version label of this table.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply all rules until the text stops changing.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for _ in 0..MAX_REPAIR_PASSES {
            let mut replaced = result.clone();
            for rule in &self.rules {
                replaced = rule
                    .pattern
                    .replace_all(&replaced, rule.replacement.as_str())
                    .into_owned();
            }
            if replaced == result {
                break;
            }
            result = replaced;
        }
        result
    }
}

impl Default for RepairRules {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules_compile() {
        let rules = RepairRules::compile(RuleTableSpec::builtin()).unwrap();
        assert_eq!(rules.version(), BUILTIN_RULES_VERSION);
        assert_eq!(rules.len(), 5);
    }

    #[test]
    fn test_apply_merges_split_verb_endings() {
        let rules = RepairRules::builtin();
        assert_eq!(rules.apply("착용하 여야 한다"), "착용하여야 한다");
        assert_eq!(rules.apply("넘어지 지 않 도록"), "넘어지 지 않도록");
        assert_eq!(rules.apply("설치하여야 한 다"), "설치하여야 한다");
    }

    #[test]
    fn test_apply_leaves_following_words_alone() {
        let rules = RepairRules::builtin();
        // "다음" is a word of its own, not a split ending
        assert_eq!(rules.apply("같이 다음 각 호"), "같이 다음 각 호");
    }

    #[test]
    fn test_apply_reaches_fixpoint() {
        let rules = RepairRules::builtin();
        let once = rules.apply("가 다 다");
        assert_eq!(once, "가다다");
        assert_eq!(rules.apply(&once), once);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{"version": "2024-11", "rules": [{"pattern": "보 호", "replacement": "보호"}]}"#;
        let rules = RepairRules::from_json_str(json).unwrap();
        assert_eq!(rules.version(), "2024-11");
        assert_eq!(rules.apply("근로자 보 호"), "근로자 보호");
    }

    #[test]
    fn test_invalid_rule_reports_index() {
        let json = r#"{"version": "bad", "rules": [{"pattern": "ok", "replacement": ""}, {"pattern": "(", "replacement": ""}]}"#;
        let err = RepairRules::from_json_str(json).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRule { index: 1, .. }));
    }

    #[test]
    fn test_empty_table_is_identity() {
        let rules = RepairRules::empty();
        assert!(rules.is_empty());
        assert_eq!(rules.apply("하 여야"), "하 여야");
    }
}
