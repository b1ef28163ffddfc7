//! Multi-document YAML configuration
//!
//! A config file may hold several YAML documents separated by `---`, each
//! fully independent. A document with `tags`/`path_patterns` keys is a
//! specification; one with `source`/`destination` keys is an
//! organization-rules document. Anything else is rejected loudly.

use crate::error::{CuratorError, Result};
use crate::organize::OrganizeRules;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A tag definition as written in YAML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagSpec {
    pub name: String,
    pub pattern: String,
}

/// A specification document
#[derive(Debug, Clone, Deserialize)]
pub struct SpecConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagSpec>,
    #[serde(default)]
    pub path_patterns: Vec<String>,
}

/// One parsed document of a config file
#[derive(Debug, Clone)]
pub enum Document {
    Specification(SpecConfig),
    Organize(OrganizeRules),
}

/// Load every document of a YAML file.
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_documents(&text)
}

/// Parse the documents of a multi-document YAML string.
pub fn parse_documents(text: &str) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for deserializer in serde_yaml::Deserializer::from_str(text) {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        if value.is_null() {
            // Empty document between separators.
            continue;
        }
        documents.push(classify(value)?);
    }
    Ok(documents)
}

fn classify(value: serde_yaml::Value) -> Result<Document> {
    let Some(mapping) = value.as_mapping() else {
        return Err(CuratorError::Config(
            "expected a mapping document".to_string(),
        ));
    };
    let has = |key: &str| mapping.contains_key(&serde_yaml::Value::from(key));

    if has("tags") || has("path_patterns") {
        Ok(Document::Specification(serde_yaml::from_value(value)?))
    } else if has("source") && has("destination") {
        Ok(Document::Organize(serde_yaml::from_value(value)?))
    } else {
        Err(CuratorError::Config(
            "document is neither a specification (tags, path_patterns) \
             nor an organization rule (source, destination)"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI: &str = r#"
tags:
  - name: mice
    pattern: "mice-([a-zA-Z0-9]+)"
path_patterns:
  - "mice-{mice}/file{extension}"
---
source: /data/raw
destination: /data/organized
pattern: "*.npy"
tag_rules:
  - name: mice
    pattern: "mice-([a-zA-Z0-9]+)"
"#;

    #[test]
    fn parses_independent_documents() {
        let documents = parse_documents(MULTI).unwrap();
        assert_eq!(documents.len(), 2);
        assert!(matches!(documents[0], Document::Specification(_)));
        assert!(matches!(documents[1], Document::Organize(_)));
    }

    #[test]
    fn empty_documents_are_ignored() {
        let documents = parse_documents("---\n---\n").unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn unknown_document_shape_is_rejected() {
        let err = parse_documents("foo: bar\n");
        assert!(matches!(err, Err(CuratorError::Config(_))));
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(parse_documents("just a string\n").is_err());
    }
}
