//! Curator - dataset curation against a path-pattern specification
//!
//! The engine is the `spec` module: a declarative grammar that extracts
//! named tag values from file paths and builds valid paths from tag
//! values, with optional segments, enumerated value sets and defaults.
//! Around it sit the tag-inference/organize pipeline (`organize`), the
//! layout indexer (`indexer`) persisting file-tag associations through
//! `curator_db`, and the multi-document YAML config loader (`config`).

pub mod config;
pub mod error;
pub mod indexer;
pub mod organize;
pub mod spec;

pub use config::{Document, SpecConfig, TagSpec};
pub use error::{CuratorError, Result};
pub use indexer::{IndexStats, Indexer};
pub use organize::{OrganizeReport, OrganizeRules, Organizer};
pub use spec::{Specification, TagValues};
