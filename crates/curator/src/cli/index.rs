//! Index command - Persist a layout's file-tag associations

use anyhow::Result;
use curator::{Indexer, Specification};
use curator_db::Database;
use std::path::PathBuf;

/// Arguments for the index command
#[derive(Debug)]
pub struct IndexArgs {
    pub spec: PathBuf,
    pub root: PathBuf,
    pub db: Option<PathBuf>,
    pub all: bool,
}

/// Execute the index command
pub fn run(args: IndexArgs) -> Result<()> {
    let spec = Specification::from_yaml_file(&args.spec)?;
    let db_path = crate::cli::index_path(args.db);
    let mut db = Database::open(&db_path)?;

    let stats = Indexer::new(&spec).index_root(&mut db, &args.root, !args.all)?;

    println!(
        "Indexed {} of {} file(s) into {} ({} outside the specification)",
        stats.files_indexed,
        stats.files_seen,
        db_path.display(),
        stats.files_skipped
    );
    Ok(())
}
