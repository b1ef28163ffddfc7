//! Tag inference pipeline
//!
//! Applies each rule's stages in order: capture, default, case fold,
//! length check, prefix/pad repair, lookup replace. Each stage's output
//! feeds the next; a value discarded by the length check can only come
//! back through the rule's default, and a strict lookup miss is terminal.

use super::lookup::LookupSet;
use super::rules::{CaseFold, TagRule, ValueSource};
use crate::spec::TagValues;
use tracing::{debug, warn};

/// Derive tag values from a source path.
///
/// One entry per rule whose pipeline completes; rules that resolve no
/// value contribute nothing, leaving the tag to template defaults
/// downstream.
pub fn infer_tags(source: &str, rules: &[TagRule], lookups: &LookupSet) -> TagValues {
    let mut tags = TagValues::new();
    for rule in rules {
        match apply_rule(rule, source, lookups) {
            Some(value) => {
                debug!(tag = rule.name.as_str(), value = %value, "tag resolved");
                tags.insert(rule.name.clone(), value);
            }
            None => debug!(tag = rule.name.as_str(), "tag unresolved"),
        }
    }
    tags
}

fn apply_rule(rule: &TagRule, source: &str, lookups: &LookupSet) -> Option<String> {
    // Stage 1: base value
    let base = match &rule.source {
        Some(ValueSource::Fixed(value)) => Some(value.clone()),
        Some(ValueSource::Captured(regex)) => regex
            .captures_iter(source)
            .last()
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        None => None,
    };

    // Stage 2: default for a value that never materialized
    let mut value = base.or_else(|| rule.default.clone())?;

    // Stage 3: case fold
    if let Some(case) = rule.case {
        value = match case {
            CaseFold::Lower => value.to_lowercase(),
            CaseFold::Upper => value.to_uppercase(),
        };
    }

    // Stages 4-5: length check with prefix/pad repair
    if let Some(expected) = rule.length {
        if value.chars().count() != expected {
            if let Some(prefix) = &rule.iffy_prefix {
                value.insert_str(0, prefix);
            }
            if let Some(pad) = &rule.pad {
                value = left_pad(&value, pad.length, pad.character);
            }
            if value.chars().count() != expected {
                warn!(
                    tag = rule.name.as_str(),
                    value = %value,
                    expected,
                    "value discarded after length check"
                );
                value = rule.default.clone()?;
            }
        }
    } else if let Some(pad) = &rule.pad {
        value = left_pad(&value, pad.length, pad.character);
    }

    // Stage 6: lookup replace
    if let Some(replace) = &rule.replace {
        match lookups.get(&replace.from, &replace.to, &value) {
            Some(mapped) => value = mapped.to_string(),
            None if replace.strict => {
                warn!(
                    tag = rule.name.as_str(),
                    value = %value,
                    "no lookup mapping found; tag unresolved"
                );
                return None;
            }
            None => {}
        }
    }

    Some(value)
}

fn left_pad(value: &str, length: usize, character: char) -> String {
    let count = value.chars().count();
    if count >= length {
        return value.to_string();
    }
    let mut out = String::with_capacity(length);
    for _ in 0..length - count {
        out.push(character);
    }
    out.push_str(value);
    out
}
