//! Directory indexer
//!
//! Walks a layout root, matches each file against the specification and
//! persists the resulting tag values to the index store. Crawl
//! scheduling and change detection live with the caller; this is a
//! single synchronous pass.

use crate::error::Result;
use crate::organize::runner::relative_path;
use crate::spec::Specification;
use curator_db::Database;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Counters from one indexing pass
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexStats {
    pub files_seen: u64,
    pub files_indexed: u64,
    pub files_skipped: u64,
}

/// Indexes layout roots against a specification
pub struct Indexer<'s> {
    spec: &'s Specification,
}

impl<'s> Indexer<'s> {
    pub fn new(spec: &'s Specification) -> Self {
        Self { spec }
    }

    /// Index every file under `root`.
    ///
    /// In valid-only mode files matching no template are skipped; with it
    /// off they are indexed with whatever the registry sweep extracts.
    pub fn index_root(
        &self,
        db: &mut Database,
        root: &Path,
        valid_only: bool,
    ) -> Result<IndexStats> {
        info!(root = %root.display(), valid_only, spec = self.spec.name(), "indexing layout");
        let root_str = root.to_string_lossy().to_string();
        let mut stats = IndexStats::default();

        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            stats.files_seen += 1;
            let rel = relative_path(root, entry.path());

            let tags = match self.spec.match_path(&rel) {
                Some(tags) => tags,
                None if valid_only => {
                    debug!(file = %rel, "file outside specification; skipping");
                    stats.files_skipped += 1;
                    continue;
                }
                None => self.spec.extract_tags(&rel),
            };
            db.put_file(&rel, &root_str, &tags)?;
            stats.files_indexed += 1;
        }

        info!(
            seen = stats.files_seen,
            indexed = stats.files_indexed,
            skipped = stats.files_skipped,
            "indexing complete"
        );
        Ok(stats)
    }
}
