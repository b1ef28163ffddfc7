//! Specification: registered tags plus ordered path-pattern templates
//!
//! Constructed once from a YAML document and read-only afterwards. All
//! match/build/extract entry points take the specification explicitly;
//! there is no ambient registry.

use super::tag::{Tag, TagRegistry};
use super::template::Template;
use super::TagValues;
use crate::config::{self, Document, SpecConfig};
use crate::error::{CuratorError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// A dataset layout specification
#[derive(Debug, Clone)]
pub struct Specification {
    name: String,
    registry: TagRegistry,
    templates: Vec<Template>,
}

impl Specification {
    /// Build a specification from a parsed config document.
    ///
    /// Any malformed tag pattern or template fails the whole document;
    /// the error names the offending pattern.
    pub fn from_config(name: &str, config: SpecConfig) -> Result<Self> {
        let mut registry = TagRegistry::new();
        for tag in &config.tags {
            registry.add(Tag::new(&tag.name, &tag.pattern)?)?;
        }
        let mut templates = Vec::with_capacity(config.path_patterns.len());
        for pattern in &config.path_patterns {
            templates.push(Template::compile(pattern, &registry)?);
        }
        Ok(Self {
            name: config.name.unwrap_or_else(|| name.to_string()),
            registry,
            templates,
        })
    }

    /// Load the first specification document from a YAML file.
    ///
    /// The specification is named after the file stem unless the document
    /// carries a `name` key.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("specification");
        for document in config::load_documents(path)? {
            if let Document::Specification(spec) = document {
                return Self::from_config(stem, spec);
            }
        }
        Err(CuratorError::Config(format!(
            "no specification document in {}",
            path.display()
        )))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Tag names registered in the specification, in declaration order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.registry.iter().map(|t| t.name()).collect()
    }

    /// Match a path against the ordered templates; the first structural
    /// match wins and later templates are not tried.
    pub fn match_path(&self, path: &str) -> Option<TagValues> {
        for template in &self.templates {
            if let Some(tags) = template.match_path(path) {
                debug!(template = template.source(), path, "path matched");
                return Some(tags);
            }
        }
        None
    }

    /// Sweep every registered tag's own pattern over the path.
    ///
    /// Template-independent: useful for foreign files that follow the
    /// naming conventions loosely but fit no template.
    pub fn extract_tags(&self, path: &str) -> TagValues {
        let mut tags = TagValues::new();
        for tag in self.registry.iter() {
            if let Some(value) = tag.extract(path) {
                tags.insert(tag.name().to_string(), value.to_string());
            }
        }
        tags
    }

    /// True if the path belongs to this specification.
    pub fn validate(&self, path: &str) -> bool {
        self.match_path(path).is_some()
    }

    /// Build a path from tags using the first template that fully
    /// resolves. `None` means no valid path exists for these tags.
    pub fn build_path(&self, tags: &TagValues) -> Option<String> {
        self.build_with(tags, false)
    }

    /// Like [`build_path`](Self::build_path), but skip templates that do
    /// not reference every supplied tag.
    pub fn build_path_strict(&self, tags: &TagValues) -> Option<String> {
        self.build_with(tags, true)
    }

    fn build_with(&self, tags: &TagValues, strict: bool) -> Option<String> {
        let tags = normalize_tags(tags);
        debug!(?tags, strict, "building path");
        for template in &self.templates {
            if strict {
                let known: HashSet<&str> = template.tag_names().into_iter().collect();
                if tags.keys().any(|k| !known.contains(k.as_str())) {
                    continue;
                }
            }
            if let Some(path) = template.build(&tags) {
                debug!(template = template.source(), path = %path, "path built");
                return Some(path);
            }
        }
        None
    }

    /// Tags that no viable template can do without: the intersection of
    /// every template's mandatory set minus the supplied ones. Used for
    /// per-file diagnostics when building fails.
    pub(crate) fn missing_mandatory(&self, tags: &TagValues) -> Vec<&str> {
        let mut missing: Option<HashSet<&str>> = None;
        for template in &self.templates {
            let unmet: HashSet<&str> = template
                .mandatory_tags()
                .into_iter()
                .filter(|name| !tags.contains_key(*name))
                .collect();
            missing = Some(match missing {
                None => unmet,
                Some(prev) => prev.intersection(&unmet).copied().collect(),
            });
        }
        let mut out: Vec<&str> = missing.unwrap_or_default().into_iter().collect();
        out.sort_unstable();
        out
    }
}

/// Drop empty values and normalize `extension` to carry a leading dot, so
/// callers may supply it either way.
fn normalize_tags(tags: &TagValues) -> TagValues {
    let mut out = TagValues::new();
    for (name, value) in tags {
        if value.is_empty() {
            continue;
        }
        if name == "extension" && !value.starts_with('.') {
            out.insert(name.clone(), format!(".{value}"));
        } else {
            out.insert(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagSpec;
    use crate::spec::tag_values;

    fn sample() -> Specification {
        Specification::from_config(
            "sample",
            SpecConfig {
                name: None,
                tags: vec![
                    TagSpec {
                        name: "mice".into(),
                        pattern: "mice-([a-zA-Z0-9]+)".into(),
                    },
                    TagSpec {
                        name: "day".into(),
                        pattern: "day-([0-9]+)".into(),
                    },
                ],
                path_patterns: vec![
                    "mice-{mice}/day-{day}/file{extension}".into(),
                    "mice-{mice}/file{extension}".into(),
                ],
            },
        )
        .unwrap()
    }

    #[test]
    fn match_and_build_round_trip() {
        let spec = sample();
        let tags = tag_values([("mice", "G1"), ("day", "02"), ("extension", ".npy")]);
        let path = spec.build_path(&tags).unwrap();
        assert_eq!(path, "mice-G1/day-02/file.npy");
        assert_eq!(spec.match_path(&path).unwrap(), tags);
    }

    #[test]
    fn first_template_wins() {
        let spec = Specification::from_config(
            "sample",
            SpecConfig {
                name: None,
                tags: vec![],
                path_patterns: vec!["{a}/x".into(), "{b}/x".into()],
            },
        )
        .unwrap();
        let tags = spec.match_path("1/x").unwrap();
        assert_eq!(tags.get("a").map(String::as_str), Some("1"));
        assert!(!tags.contains_key("b"));
    }

    #[test]
    fn build_falls_through_to_later_template() {
        let spec = sample();
        // No day tag: the first template cannot resolve, the second can.
        let tags = tag_values([("mice", "G1"), ("extension", ".npy")]);
        assert_eq!(spec.build_path(&tags).as_deref(), Some("mice-G1/file.npy"));
    }

    #[test]
    fn extension_gains_leading_dot() {
        let spec = sample();
        let tags = tag_values([("mice", "G1"), ("day", "02"), ("extension", "npy")]);
        assert_eq!(
            spec.build_path(&tags).as_deref(),
            Some("mice-G1/day-02/file.npy")
        );
    }

    #[test]
    fn empty_values_are_dropped() {
        let spec = sample();
        let tags = tag_values([("mice", "G1"), ("day", ""), ("extension", ".npy")]);
        assert_eq!(spec.build_path(&tags).as_deref(), Some("mice-G1/file.npy"));
    }

    #[test]
    fn strict_build_skips_templates_missing_supplied_tags() {
        let spec = sample();
        let tags = tag_values([("mice", "G1"), ("day", "02"), ("extension", ".npy")]);
        // Both templates resolve for the tag subset, but only the first
        // references day.
        assert_eq!(
            spec.build_path_strict(&tags).as_deref(),
            Some("mice-G1/day-02/file.npy")
        );
        let extra = tag_values([("mice", "G1"), ("run", "7"), ("extension", ".npy")]);
        assert_eq!(spec.build_path_strict(&extra), None);
    }

    #[test]
    fn extract_tags_sweeps_all_patterns() {
        let spec = sample();
        let tags = spec.extract_tags("stash/mice-G1_day-02.bin");
        assert_eq!(tags.get("mice").map(String::as_str), Some("G1"));
        assert_eq!(tags.get("day").map(String::as_str), Some("02"));
    }

    #[test]
    fn validate_accepts_only_template_shaped_paths() {
        let spec = sample();
        assert!(spec.validate("mice-G1/day-02/file.npy"));
        assert!(!spec.validate("other/mice-G1.npy"));
    }

    #[test]
    fn missing_mandatory_reports_common_gaps() {
        let spec = sample();
        let tags = tag_values([("extension", ".npy")]);
        assert_eq!(spec.missing_mandatory(&tags), vec!["mice"]);
    }
}
