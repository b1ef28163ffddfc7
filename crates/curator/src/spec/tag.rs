//! Tag definitions and the tag registry
//!
//! A tag pairs a name with a regex whose single capturing group extracts
//! the tag's value from a path. The group's source text is lifted out at
//! compile time so templates can embed it as the sub-pattern for a
//! `{placeholder}` referencing the tag.

use crate::error::{CuratorError, Result};
use regex::Regex;
use std::collections::HashMap;

/// A named tag with its extraction pattern
#[derive(Debug, Clone)]
pub struct Tag {
    name: String,
    pattern: Regex,
    group: String,
}

impl Tag {
    /// Compile a tag definition.
    ///
    /// The pattern must contain exactly one capturing group; anything else
    /// is rejected so that extraction is unambiguous.
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() != 2 {
            return Err(CuratorError::TagPattern {
                name: name.to_string(),
                pattern: pattern.to_string(),
            });
        }
        let group = capture_group_source(pattern)
            .ok_or_else(|| CuratorError::TagPattern {
                name: name.to_string(),
                pattern: pattern.to_string(),
            })?
            .to_string();
        Ok(Self {
            name: name.to_string(),
            pattern: regex,
            group,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Source text inside the pattern's capturing group.
    pub(crate) fn group_source(&self) -> &str {
        &self.group
    }

    /// Extract the tag's value from a path (first match wins).
    pub fn extract<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

/// Ordered collection of tags with by-name lookup.
///
/// Owned by a [`Specification`](super::Specification) and immutable after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<Tag>,
    by_name: HashMap<String, usize>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag. Duplicate names are a load-time error.
    pub fn add(&mut self, tag: Tag) -> Result<()> {
        if self.by_name.contains_key(tag.name()) {
            return Err(CuratorError::DuplicateTag(tag.name().to_string()));
        }
        self.by_name.insert(tag.name().to_string(), self.tags.len());
        self.tags.push(tag);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.by_name.get(name).map(|&i| &self.tags[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Return the source text inside a pattern's first capturing group.
///
/// Scans the pattern tracking escapes and character classes so parens
/// inside `[...]` or after `\` do not count. Named groups (`(?P<x>...)`,
/// `(?<x>...)`) are capturing; `(?:`, lookarounds and flags are not.
pub(crate) fn capture_group_source(pattern: &str) -> Option<&str> {
    let mut escaped = false;
    let mut in_class = false;
    // (is_capturing, content_start)
    let mut stack: Vec<(bool, usize)> = Vec::new();
    for (i, ch) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                let rest = &pattern[i + 1..];
                if let Some(named) = rest.strip_prefix("?P<").or_else(|| rest.strip_prefix("?<")) {
                    let close = named.find('>')?;
                    let content_start = pattern.len() - named.len() + close + 1;
                    stack.push((true, content_start));
                } else {
                    stack.push((!rest.starts_with('?'), i + 1));
                }
            }
            ')' if !in_class => {
                let (capturing, start) = stack.pop()?;
                if capturing {
                    return Some(&pattern[start..i]);
                }
            }
            _ => {}
        }
    }
    None
}
