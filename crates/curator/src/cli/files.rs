//! Files command - Query indexed files by tag filters

use crate::cli::output::{parse_pairs, print_table};
use anyhow::Result;
use curator_db::Database;
use std::path::PathBuf;

/// Arguments for the files command
#[derive(Debug)]
pub struct FilesArgs {
    pub db: Option<PathBuf>,
    pub filters: Vec<String>,
    pub root: Option<PathBuf>,
}

/// Execute the files command
pub fn run(args: FilesArgs) -> Result<()> {
    let db = Database::open_existing(crate::cli::index_path(args.db))?;
    let filters = parse_pairs(&args.filters)?;
    let root = args.root.map(|p| p.to_string_lossy().to_string());

    let files = db.query(root.as_deref(), &filters)?;
    if files.is_empty() {
        println!("No files match.");
        return Ok(());
    }
    print_table(
        &["Path", "Root"],
        files
            .iter()
            .map(|f| vec![f.path.clone(), f.root.clone()])
            .collect(),
    );
    println!("{} file(s)", files.len());
    Ok(())
}
