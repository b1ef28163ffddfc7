//! Error types for the curator engine

use std::io;
use thiserror::Error;

/// Curator error type
#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Index error: {0}")]
    Index(#[from] curator_db::DbError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("tag '{name}': pattern '{pattern}' must contain exactly one capturing group")]
    TagPattern { name: String, pattern: String },

    #[error("duplicate tag '{0}' in specification")]
    DuplicateTag(String),

    #[error("template '{pattern}': {reason}")]
    Template { pattern: String, reason: String },

    #[error("template '{pattern}': default '{default}' is outside the permitted values of '{{{name}}}'")]
    InconsistentDefault {
        pattern: String,
        name: String,
        default: String,
    },

    #[error("tag rule '{rule}': {reason}")]
    Rule { rule: String, reason: String },

    #[error("lookup table {path}: {reason}")]
    Lookup { path: String, reason: String },

    #[error("unresolved mandatory tag(s) '{tag}' for {path}")]
    UnresolvedTag { tag: String, path: String },

    #[error("no template accepts the inferred tag values for {0}")]
    NoDestination(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CuratorError>;
