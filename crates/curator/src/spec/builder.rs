//! Path building from tag values
//!
//! Walks the template's segment tree. Placeholders resolve to the supplied
//! value, or their default, or make the enclosing scope unresolvable. An
//! optional group whose contents cannot resolve is omitted; an unresolvable
//! placeholder at the top level fails the template. A supplied value
//! outside a placeholder's enumeration fails the template outright, even
//! inside an optional group.

use super::template::{Placeholder, Segment, Template};
use super::TagValues;

/// Marker for a supplied value that violates an enumeration constraint.
struct EnumViolation;

impl Template {
    /// Build a path from tag values, or `None` when this template cannot
    /// be fully resolved. Pure: identical inputs yield identical output.
    pub fn build(&self, tags: &TagValues) -> Option<String> {
        match emit(self.segments(), tags) {
            Ok(path) => path,
            Err(EnumViolation) => None,
        }
    }
}

/// Emit a segment sequence. `Ok(None)` means an unresolvable mandatory
/// placeholder at this level; the caller decides whether that omits an
/// optional group or fails the template.
fn emit(segments: &[Segment], tags: &TagValues) -> Result<Option<String>, EnumViolation> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(p) => match resolve(p, tags)? {
                Some(value) => out.push_str(value),
                None => return Ok(None),
            },
            Segment::Optional(inner) => {
                if let Some(text) = emit(inner, tags)? {
                    out.push_str(&text);
                }
            }
        }
    }
    Ok(Some(out))
}

fn resolve<'t>(p: &'t Placeholder, tags: &'t TagValues) -> Result<Option<&'t str>, EnumViolation> {
    if let Some(value) = tags.get(&p.name) {
        if let Some(values) = &p.values {
            if !values.iter().any(|v| v == value) {
                return Err(EnumViolation);
            }
        }
        return Ok(Some(value));
    }
    Ok(p.default.as_deref())
}

#[cfg(test)]
mod tests {
    use crate::spec::tag::{Tag, TagRegistry};
    use crate::spec::template::Template;
    use crate::spec::{tag_values, TagValues};

    fn registry() -> TagRegistry {
        let mut registry = TagRegistry::new();
        registry.add(Tag::new("mice", "mice-([a-zA-Z0-9]+)").unwrap()).unwrap();
        registry.add(Tag::new("day", "day-([0-9]+)").unwrap()).unwrap();
        registry
    }

    #[test]
    fn builds_concrete_path() {
        let t = Template::compile("mice-{mice}/day-{day}/file{extension}", &registry()).unwrap();
        let tags = tag_values([("mice", "G1"), ("day", "02"), ("extension", ".npy")]);
        assert_eq!(t.build(&tags).as_deref(), Some("mice-G1/day-02/file.npy"));
    }

    #[test]
    fn build_is_deterministic() {
        let t = Template::compile("mice-{mice}/day-{day}", &registry()).unwrap();
        let tags = tag_values([("mice", "G1"), ("day", "02")]);
        assert_eq!(t.build(&tags), t.build(&tags));
    }

    #[test]
    fn optional_group_omitted_without_value() {
        let t = Template::compile("a[/{x}]/b", &registry()).unwrap();
        assert_eq!(t.build(&TagValues::new()).as_deref(), Some("a/b"));
        assert_eq!(
            t.build(&tag_values([("x", "1")])).as_deref(),
            Some("a/1/b")
        );
    }

    #[test]
    fn missing_mandatory_fails_template() {
        let t = Template::compile("mice-{mice}/day-{day}", &registry()).unwrap();
        assert_eq!(t.build(&tag_values([("mice", "G1")])), None);
    }

    #[test]
    fn default_substitutes_missing_value() {
        let t = Template::compile("day-{day|01}", &registry()).unwrap();
        assert_eq!(t.build(&TagValues::new()).as_deref(), Some("day-01"));
        assert_eq!(t.build(&tag_values([("day", "02")])).as_deref(), Some("day-02"));
    }

    #[test]
    fn enumeration_violation_never_emits() {
        let t = Template::compile("{x<foo|bar>|foo}", &registry()).unwrap();
        // Supplied-but-invalid fails the template; the default does not
        // paper over it.
        assert_eq!(t.build(&tag_values([("x", "baz")])), None);
        assert_eq!(t.build(&TagValues::new()).as_deref(), Some("foo"));
    }

    #[test]
    fn enumeration_violation_inside_optional_fails_template() {
        let t = Template::compile("a[/{x<1|2>}]/b", &registry()).unwrap();
        assert_eq!(t.build(&tag_values([("x", "9")])), None);
        assert_eq!(t.build(&TagValues::new()).as_deref(), Some("a/b"));
    }

    #[test]
    fn defaulted_placeholder_keeps_optional_group() {
        let t = Template::compile("a[/ses-{session|01}]/b", &registry()).unwrap();
        assert_eq!(
            t.build(&TagValues::new()).as_deref(),
            Some("a/ses-01/b")
        );
    }

    #[test]
    fn nested_optional_resolves_independently() {
        let t = Template::compile("a[/{x}[/{y}]]/b", &registry()).unwrap();
        assert_eq!(
            t.build(&tag_values([("x", "1")])).as_deref(),
            Some("a/1/b")
        );
        assert_eq!(
            t.build(&tag_values([("x", "1"), ("y", "2")])).as_deref(),
            Some("a/1/2/b")
        );
        assert_eq!(
            t.build(&tag_values([("y", "2")])).as_deref(),
            Some("a/b")
        );
    }
}
