//! Path matching against compiled templates
//!
//! A path matches a template when the generated regex matches the whole
//! path. Captured groups populate the tag-value mapping; groups inside an
//! optional segment that was not present contribute nothing.

use super::template::Template;
use super::TagValues;

impl Template {
    /// Match a path against this template, extracting tag values.
    ///
    /// Returns `None` when the path does not belong to this template. A
    /// tag captured more than once must capture the same text everywhere,
    /// otherwise the template is treated as non-matching.
    pub fn match_path(&self, path: &str) -> Option<TagValues> {
        let captures = self.regex().captures(path)?;
        let mut tags = TagValues::new();
        for (id, tag) in self.groups() {
            let Some(m) = captures.name(id) else {
                continue;
            };
            match tags.get(tag.as_str()) {
                Some(previous) if previous != m.as_str() => return None,
                _ => {
                    tags.insert(tag.clone(), m.as_str().to_string());
                }
            }
        }
        Some(tags)
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::tag::{Tag, TagRegistry};
    use crate::spec::template::Template;

    fn registry() -> TagRegistry {
        let mut registry = TagRegistry::new();
        registry.add(Tag::new("mice", "mice-([a-zA-Z0-9]+)").unwrap()).unwrap();
        registry.add(Tag::new("day", "day-([0-9]+)").unwrap()).unwrap();
        registry
    }

    #[test]
    fn extracts_tags_from_matching_path() {
        let t = Template::compile("mice-{mice}/day-{day}/file{extension}", &registry()).unwrap();
        let tags = t.match_path("mice-G1/day-02/file.npy").unwrap();
        assert_eq!(tags.get("mice").map(String::as_str), Some("G1"));
        assert_eq!(tags.get("day").map(String::as_str), Some("02"));
        assert_eq!(tags.get("extension").map(String::as_str), Some(".npy"));
    }

    #[test]
    fn anchored_both_ends() {
        let t = Template::compile("day-{day}", &registry()).unwrap();
        assert!(t.match_path("day-02").is_some());
        assert!(t.match_path("x/day-02").is_none());
        assert!(t.match_path("day-02/x").is_none());
    }

    #[test]
    fn omitted_optional_yields_no_entry() {
        let t = Template::compile("a[/{day}]/b", &registry()).unwrap();
        let tags = t.match_path("a/b").unwrap();
        assert!(!tags.contains_key("day"));

        let tags = t.match_path("a/02/b").unwrap();
        assert_eq!(tags.get("day").map(String::as_str), Some("02"));
    }

    #[test]
    fn enumeration_restricts_match() {
        let t = Template::compile("run-{run<1|2>}", &registry()).unwrap();
        assert!(t.match_path("run-1").is_some());
        assert!(t.match_path("run-3").is_none());
    }

    #[test]
    fn repeated_tag_must_agree() {
        let t = Template::compile("{day}/{day}", &registry()).unwrap();
        assert!(t.match_path("02/02").is_some());
        assert!(t.match_path("02/03").is_none());
    }

    #[test]
    fn registered_pattern_rejects_bad_values() {
        let t = Template::compile("day-{day}/f", &registry()).unwrap();
        assert!(t.match_path("day-ab/f").is_none());
    }
}
