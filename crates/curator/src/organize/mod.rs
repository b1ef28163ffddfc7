//! Dataset organization
//!
//! An organization run takes a source tree, a glob over its contents, an
//! ordered list of tag-inference rules and a destination specification,
//! and copies each candidate file to the path the specification builds
//! for its inferred tags.

pub mod lookup;
pub mod pipeline;
pub mod rules;
pub mod runner;

pub use lookup::LookupSet;
pub use pipeline::infer_tags;
pub use rules::{OrganizeRules, TagRule, TagRuleSpec};
pub use runner::{OrganizeReport, Organizer};
