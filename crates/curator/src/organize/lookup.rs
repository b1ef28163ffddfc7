//! CSV lookup tables for the replace stage
//!
//! The CSV backing `replace` rules is read once per organize run. Each
//! `(from, to)` column pair used by a rule becomes an immutable
//! one-to-one map; behavior within a run is deterministic because no
//! re-reads happen per tag.

use crate::error::{CuratorError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Lookup maps for every `(from, to)` column pair of a run
#[derive(Debug, Default)]
pub struct LookupSet {
    maps: HashMap<(String, String), HashMap<String, String>>,
}

impl LookupSet {
    /// Read the CSV once and build a map per requested column pair.
    ///
    /// A missing column or a key mapped to two different values is a
    /// load-time error.
    pub fn load(path: &Path, pairs: &[(String, String)]) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| CuratorError::Lookup {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CuratorError::Lookup {
                    path: path.display().to_string(),
                    reason: format!("missing column '{name}'"),
                })
        };

        let mut columns = Vec::with_capacity(pairs.len());
        for (from, to) in pairs {
            columns.push((from.clone(), to.clone(), column(from)?, column(to)?));
        }

        let mut maps: HashMap<(String, String), HashMap<String, String>> = HashMap::new();
        for record in reader.records() {
            let record = record?;
            for (from, to, from_idx, to_idx) in &columns {
                let (Some(key), Some(value)) = (record.get(*from_idx), record.get(*to_idx))
                else {
                    continue;
                };
                let map = maps.entry((from.clone(), to.clone())).or_default();
                if let Some(existing) = map.get(key) {
                    if existing != value {
                        return Err(CuratorError::Lookup {
                            path: path.display().to_string(),
                            reason: format!(
                                "key '{key}' in column '{from}' maps to both '{existing}' and '{value}'"
                            ),
                        });
                    }
                } else {
                    map.insert(key.to_string(), value.to_string());
                }
            }
        }

        info!(path = %path.display(), pairs = pairs.len(), "lookup table loaded");
        Ok(Self { maps })
    }

    /// Look a value up in the map for a column pair.
    pub fn get(&self, from: &str, to: &str, key: &str) -> Option<&str> {
        self.maps
            .get(&(from.to_string(), to.to_string()))
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn pairs(from: &str, to: &str) -> Vec<(String, String)> {
        vec![(from.to_string(), to.to_string())]
    }

    #[test]
    fn loads_column_pair() {
        let file = table("old,new\nG1,M001\nG2,M002\n");
        let set = LookupSet::load(file.path(), &pairs("old", "new")).unwrap();
        assert_eq!(set.get("old", "new", "G1"), Some("M001"));
        assert_eq!(set.get("old", "new", "G3"), None);
    }

    #[test]
    fn reverse_pair_is_independent() {
        let file = table("old,new\nG1,M001\n");
        let set = LookupSet::load(
            file.path(),
            &[
                ("old".to_string(), "new".to_string()),
                ("new".to_string(), "old".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(set.get("new", "old", "M001"), Some("G1"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let file = table("old,new\nG1,M001\n");
        let err = LookupSet::load(file.path(), &pairs("old", "subject"));
        assert!(matches!(err, Err(CuratorError::Lookup { .. })));
    }

    #[test]
    fn conflicting_duplicate_key_is_an_error() {
        let file = table("old,new\nG1,M001\nG1,M002\n");
        let err = LookupSet::load(file.path(), &pairs("old", "new"));
        assert!(matches!(err, Err(CuratorError::Lookup { .. })));
    }

    #[test]
    fn identical_duplicate_rows_are_tolerated() {
        let file = table("old,new\nG1,M001\nG1,M001\n");
        assert!(LookupSet::load(file.path(), &pairs("old", "new")).is_ok());
    }
}
