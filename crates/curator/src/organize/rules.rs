//! Organization rule documents and their compiled forms
//!
//! The YAML shapes (`OrganizeRules`, `TagRuleSpec`) deserialize with
//! `deny_unknown_fields`, so a misspelled rule key is a load-time error
//! rather than a silently inert rule. `TagRuleSpec::compile` turns the
//! free-form document into a typed [`TagRule`] dispatched by exhaustive
//! matching in the pipeline.

use crate::error::{CuratorError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;

/// Where an added file lands relative to an organized file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Inside the built path, treated as a directory
    Content,
    /// Next to the built path
    Fellow,
}

/// An extra file copied alongside every organized file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Addition {
    pub path: PathBuf,
    pub position: Position,
}

/// Re-tagging applied to fellow files whose path matches `target`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameRule {
    pub target: String,
    pub suffix: String,
}

/// Case transform applied in the inference pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFold {
    Lower,
    Upper,
}

/// Left-padding applied to short values
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PadSpec {
    pub length: usize,
    #[serde(default = "default_pad_char")]
    pub character: char,
}

fn default_pad_char() -> char {
    '0'
}

/// Lookup-replace through the run's CSV mapping table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceSpec {
    /// Column the current value is looked up in
    pub from: String,
    /// Column the replacement is taken from
    pub to: String,
    /// When false, a missing mapping retains the current value instead of
    /// discarding the tag
    #[serde(default = "default_strict")]
    pub strict: bool,
}

fn default_strict() -> bool {
    true
}

/// A tag-inference rule as written in YAML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagRuleSpec {
    pub name: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub case: Option<CaseFold>,
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub iffy_prefix: Option<String>,
    #[serde(default)]
    pub pad: Option<PadSpec>,
    #[serde(default)]
    pub replace: Option<ReplaceSpec>,
}

impl TagRuleSpec {
    /// Validate and compile the rule.
    pub fn compile(&self) -> Result<TagRule> {
        let source = match (&self.value, &self.pattern) {
            (Some(_), Some(_)) => {
                return Err(self.invalid("'value' and 'pattern' are mutually exclusive"))
            }
            (Some(value), None) => Some(ValueSource::Fixed(value.clone())),
            (None, Some(pattern)) => {
                let regex = Regex::new(pattern)?;
                if regex.captures_len() != 2 {
                    return Err(self.invalid("'pattern' must contain exactly one capturing group"));
                }
                Some(ValueSource::Captured(regex))
            }
            (None, None) => None,
        };
        if source.is_none() && self.default.is_none() {
            return Err(self.invalid("needs one of 'value', 'pattern' or 'default'"));
        }
        if self.iffy_prefix.is_some() && self.length.is_none() {
            return Err(self.invalid("'iffy_prefix' requires 'length'"));
        }
        Ok(TagRule {
            name: self.name.clone(),
            source,
            default: self.default.clone(),
            case: self.case,
            length: self.length,
            iffy_prefix: self.iffy_prefix.clone(),
            pad: self.pad.clone(),
            replace: self.replace.clone(),
        })
    }

    fn invalid(&self, reason: &str) -> CuratorError {
        CuratorError::Rule {
            rule: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

/// How a rule obtains its base value
#[derive(Debug, Clone)]
pub enum ValueSource {
    /// Fixed value from the rule itself
    Fixed(String),
    /// Last match of the pattern's capturing group against the file path
    Captured(Regex),
}

/// A compiled tag-inference rule
#[derive(Debug, Clone)]
pub struct TagRule {
    pub name: String,
    pub source: Option<ValueSource>,
    pub default: Option<String>,
    pub case: Option<CaseFold>,
    pub length: Option<usize>,
    pub iffy_prefix: Option<String>,
    pub pad: Option<PadSpec>,
    pub replace: Option<ReplaceSpec>,
}

/// An organization-rules document
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizeRules {
    /// Directory the candidate files are discovered under
    pub source: PathBuf,
    /// Root the built paths are joined to
    pub destination: PathBuf,
    /// Glob over forward-slash relative paths selecting candidates
    pub pattern: String,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub copy_fellows: bool,
    #[serde(default)]
    pub add: Vec<Addition>,
    /// Literal relative paths excluded together with their subtrees
    #[serde(default)]
    pub skip: Vec<String>,
    /// CSV lookup table backing `replace` rules
    #[serde(default)]
    pub map: Option<PathBuf>,
    pub tag_rules: Vec<TagRuleSpec>,
    #[serde(default)]
    pub rename_rules: Vec<RenameRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(yaml: &str) -> TagRuleSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn compiles_capture_rule() {
        let spec = rule("{name: day, pattern: 'day([0-9]+)_', length: 2, iffy_prefix: '0'}");
        let compiled = spec.compile().unwrap();
        assert!(matches!(compiled.source, Some(ValueSource::Captured(_))));
        assert_eq!(compiled.length, Some(2));
    }

    #[test]
    fn rejects_value_and_pattern_together() {
        let spec = rule("{name: day, value: '01', pattern: 'day([0-9]+)'}");
        assert!(matches!(spec.compile(), Err(CuratorError::Rule { .. })));
    }

    #[test]
    fn rejects_rule_without_any_source() {
        let spec = rule("{name: day}");
        assert!(matches!(spec.compile(), Err(CuratorError::Rule { .. })));
    }

    #[test]
    fn default_only_rule_is_allowed() {
        let spec = rule("{name: day, default: '01'}");
        assert!(spec.compile().is_ok());
    }

    #[test]
    fn rejects_iffy_prefix_without_length() {
        let spec = rule("{name: day, pattern: 'day([0-9]+)', iffy_prefix: '0'}");
        assert!(matches!(spec.compile(), Err(CuratorError::Rule { .. })));
    }

    #[test]
    fn rejects_multi_group_pattern() {
        let spec = rule("{name: day, pattern: '(day)([0-9]+)'}");
        assert!(matches!(spec.compile(), Err(CuratorError::Rule { .. })));
    }

    #[test]
    fn unknown_rule_key_fails_deserialization() {
        let err = serde_yaml::from_str::<TagRuleSpec>("{name: day, patern: 'day([0-9]+)'}");
        assert!(err.is_err());
    }

    #[test]
    fn organize_rules_defaults() {
        let rules: OrganizeRules = serde_yaml::from_str(
            "source: /data/raw\ndestination: /data/organized\npattern: '*.npy'\ntag_rules: []\n",
        )
        .unwrap();
        assert!(!rules.overwrite);
        assert!(!rules.copy_fellows);
        assert!(rules.add.is_empty());
        assert!(rules.map.is_none());
    }
}
