//! Path-pattern template compiler
//!
//! Parses a template string like
//! `mice-{mice}/day-{day}[/run-{run<1|2>|1}]/file{extension}` into a
//! segment tree of literals, nestable `[optional]` groups and
//! `{name<values>|default}` placeholders, and generates the anchored
//! matcher regex used by [`match_path`](Template::match_path).

use super::tag::TagRegistry;
use crate::error::{CuratorError, Result};
use regex::Regex;

/// One placeholder occurrence inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Tag name this placeholder references
    pub name: String,
    /// Closed set of permitted values, if an enumeration was given
    pub values: Option<Vec<String>>,
    /// Value substituted when the tag is absent
    pub default: Option<String>,
}

/// A node of the compiled template tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim text, matched and emitted as-is
    Literal(String),
    /// A group that may be entirely omitted when matching or building
    Optional(Vec<Segment>),
    /// A tag reference
    Placeholder(Placeholder),
}

/// A compiled path-pattern template
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    regex: Regex,
    /// Capture group id -> tag name, one entry per placeholder occurrence
    groups: Vec<(String, String)>,
}

impl Template {
    /// Compile a template string against a tag registry.
    ///
    /// Malformed bracket nesting, empty placeholder names and a default
    /// outside its enumeration set are compile-time errors.
    pub fn compile(source: &str, registry: &TagRegistry) -> Result<Self> {
        let segments = Parser::new(source).parse()?;
        let mut groups = Vec::new();
        let mut expr = String::from("^");
        append_regex(&segments, registry, &mut groups, &mut expr);
        expr.push('$');
        let regex = Regex::new(&expr).map_err(|e| CuratorError::Template {
            pattern: source.to_string(),
            reason: format!("generated matcher is invalid: {e}"),
        })?;
        Ok(Self {
            source: source.to_string(),
            segments,
            regex,
            groups,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn groups(&self) -> &[(String, String)] {
        &self.groups
    }

    /// Tag names referenced anywhere in the template, in order, deduplicated.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_names(&self.segments, &mut names);
        names
    }

    /// Tags that must be supplied for this template to build: placeholders
    /// outside every optional group that carry no default.
    pub fn mandatory_tags(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(p) = segment {
                if p.default.is_none() && !names.contains(&p.name.as_str()) {
                    names.push(p.name.as_str());
                }
            }
        }
        names
    }
}

fn collect_names<'t>(segments: &'t [Segment], names: &mut Vec<&'t str>) {
    for segment in segments {
        match segment {
            Segment::Literal(_) => {}
            Segment::Optional(inner) => collect_names(inner, names),
            Segment::Placeholder(p) => {
                if !names.contains(&p.name.as_str()) {
                    names.push(p.name.as_str());
                }
            }
        }
    }
}

fn append_regex(
    segments: &[Segment],
    registry: &TagRegistry,
    groups: &mut Vec<(String, String)>,
    expr: &mut String,
) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => expr.push_str(&regex::escape(text)),
            Segment::Optional(inner) => {
                expr.push_str("(?:");
                append_regex(inner, registry, groups, expr);
                expr.push_str(")?");
            }
            Segment::Placeholder(p) => {
                let id = format!("g{}", groups.len());
                let sub = match (&p.values, registry.get(&p.name)) {
                    // Enumeration constraints are enforced by the matcher
                    // itself: an out-of-set value simply fails the regex.
                    (Some(values), _) => values
                        .iter()
                        .map(|v| regex::escape(v))
                        .collect::<Vec<_>>()
                        .join("|"),
                    (None, Some(tag)) => tag.group_source().to_string(),
                    (None, None) => "[^/]+".to_string(),
                };
                expr.push_str(&format!("(?P<{id}>{sub})"));
                groups.push((id, p.name.clone()));
            }
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Vec<Segment>> {
        self.segments(false)
    }

    fn segments(&mut self, nested: bool) -> Result<Vec<Segment>> {
        let mut out = Vec::new();
        let mut literal = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            match c {
                ']' if nested => break,
                ']' => return Err(self.error("unbalanced ']'")),
                '[' => {
                    flush_literal(&mut literal, &mut out);
                    self.pos += 1;
                    let inner = self.segments(true)?;
                    if self.chars.get(self.pos) != Some(&']') {
                        return Err(self.error("unbalanced '['"));
                    }
                    self.pos += 1;
                    out.push(Segment::Optional(inner));
                }
                '{' => {
                    flush_literal(&mut literal, &mut out);
                    out.push(self.placeholder()?);
                }
                '}' => return Err(self.error("'}' without matching '{'")),
                _ => {
                    literal.push(c);
                    self.pos += 1;
                }
            }
        }
        flush_literal(&mut literal, &mut out);
        Ok(out)
    }

    fn placeholder(&mut self) -> Result<Segment> {
        self.pos += 1; // consume '{'
        let mut name = String::new();
        while let Some(&c) = self.chars.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error("empty placeholder name"));
        }

        let mut values = None;
        if self.chars.get(self.pos) == Some(&'<') {
            self.pos += 1;
            values = Some(self.enumeration(&name)?);
        }

        let mut default = None;
        if self.chars.get(self.pos) == Some(&'|') {
            self.pos += 1;
            let mut text = String::new();
            while let Some(&c) = self.chars.get(self.pos) {
                if c == '}' {
                    break;
                }
                if matches!(c, '{' | '[' | ']' | '<' | '>') {
                    return Err(self.error(&format!("invalid character '{c}' in default")));
                }
                text.push(c);
                self.pos += 1;
            }
            if text.is_empty() {
                return Err(self.error(&format!("empty default for '{{{name}}}'")));
            }
            default = Some(text);
        }

        if self.chars.get(self.pos) != Some(&'}') {
            return Err(self.error("unbalanced '{'"));
        }
        self.pos += 1;

        if let (Some(values), Some(default)) = (&values, &default) {
            if !values.iter().any(|v| v == default) {
                return Err(CuratorError::InconsistentDefault {
                    pattern: self.source.to_string(),
                    name,
                    default: default.clone(),
                });
            }
        }

        Ok(Segment::Placeholder(Placeholder {
            name,
            values,
            default,
        }))
    }

    fn enumeration(&mut self, name: &str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        let mut current = String::new();
        loop {
            match self.chars.get(self.pos) {
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('|') => {
                    if current.is_empty() {
                        return Err(self.error(&format!("empty value in '{{{name}<...>}}'")));
                    }
                    values.push(std::mem::take(&mut current));
                    self.pos += 1;
                }
                Some(&c) => {
                    if matches!(c, '{' | '}' | '[' | ']' | '<') {
                        return Err(self.error(&format!("invalid character '{c}' in enumeration")));
                    }
                    current.push(c);
                    self.pos += 1;
                }
                None => return Err(self.error("unbalanced '<'")),
            }
        }
        if current.is_empty() {
            return Err(self.error(&format!("empty value in '{{{name}<...>}}'")));
        }
        values.push(current);
        Ok(values)
    }

    fn error(&self, reason: &str) -> CuratorError {
        CuratorError::Template {
            pattern: self.source.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn flush_literal(literal: &mut String, out: &mut Vec<Segment>) {
    if !literal.is_empty() {
        out.push(Segment::Literal(std::mem::take(literal)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::tag::Tag;

    fn registry() -> TagRegistry {
        let mut registry = TagRegistry::new();
        registry.add(Tag::new("mice", "mice-([a-zA-Z0-9]+)").unwrap()).unwrap();
        registry.add(Tag::new("day", "day-([0-9]+)").unwrap()).unwrap();
        registry
    }

    #[test]
    fn parses_literals_and_placeholders() {
        let t = Template::compile("mice-{mice}/day-{day}", &registry()).unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("mice-".into()),
                Segment::Placeholder(Placeholder {
                    name: "mice".into(),
                    values: None,
                    default: None,
                }),
                Segment::Literal("/day-".into()),
                Segment::Placeholder(Placeholder {
                    name: "day".into(),
                    values: None,
                    default: None,
                }),
            ]
        );
    }

    #[test]
    fn parses_nested_optionals() {
        let t = Template::compile("a[/{x}[/{y}]]/b", &registry()).unwrap();
        let Segment::Optional(outer) = &t.segments()[1] else {
            panic!("expected optional");
        };
        assert!(matches!(outer.last(), Some(Segment::Optional(_))));
    }

    #[test]
    fn parses_enumeration_and_default() {
        let t = Template::compile("{day<01|02>|01}", &registry()).unwrap();
        assert_eq!(
            t.segments(),
            &[Segment::Placeholder(Placeholder {
                name: "day".into(),
                values: Some(vec!["01".into(), "02".into()]),
                default: Some("01".into()),
            })]
        );
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        for bad in ["a[b", "a]b", "a{b", "a}b", "{x<1|2}", "[{x}"] {
            assert!(
                matches!(
                    Template::compile(bad, &registry()),
                    Err(CuratorError::Template { .. })
                ),
                "expected compile error for {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_empty_placeholder_name() {
        assert!(Template::compile("{}", &registry()).is_err());
        assert!(Template::compile("{<1|2>}", &registry()).is_err());
    }

    #[test]
    fn rejects_default_outside_enumeration() {
        let err = Template::compile("{day<01|02>|03}", &registry());
        assert!(matches!(err, Err(CuratorError::InconsistentDefault { .. })));
    }

    #[test]
    fn mandatory_excludes_optional_and_defaulted() {
        let t = Template::compile("mice-{mice}[/day-{day}]/f{extension|.npy}", &registry()).unwrap();
        assert_eq!(t.mandatory_tags(), vec!["mice"]);
        assert_eq!(t.tag_names(), vec!["mice", "day", "extension"]);
    }

    #[test]
    fn registered_tag_constrains_matcher() {
        let t = Template::compile("day-{day}", &registry()).unwrap();
        assert!(t.regex().is_match("day-02"));
        assert!(!t.regex().is_match("day-xx"));
    }
}
