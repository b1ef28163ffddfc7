//! Path-pattern specification engine
//!
//! A specification is a set of named tags (each with a regex extraction
//! pattern) plus an ordered list of path-pattern templates. Templates are
//! compiled once into a segment tree and an anchored matcher regex, then
//! reused for both directions: extracting tag values from a path and
//! building a path from tag values.

pub mod builder;
pub mod matcher;
pub mod specification;
pub mod tag;
pub mod template;

pub use specification::Specification;
pub use tag::{Tag, TagRegistry};
pub use template::{Placeholder, Segment, Template};

/// Mapping of tag name to value.
///
/// Ordered so that diagnostics and serialized output are deterministic.
pub type TagValues = std::collections::BTreeMap<String, String>;

/// Build a [`TagValues`] from `(name, value)` pairs. Test and CLI helper.
pub fn tag_values<I, K, V>(pairs: I) -> TagValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
