//! Values command - List the distinct values of a tag

use crate::cli::output::parse_pairs;
use anyhow::Result;
use curator_db::Database;
use std::path::PathBuf;

/// Arguments for the values command
#[derive(Debug)]
pub struct ValuesArgs {
    pub tag: String,
    pub db: Option<PathBuf>,
    pub filters: Vec<String>,
}

/// Execute the values command
pub fn run(args: ValuesArgs) -> Result<()> {
    let db = Database::open_existing(crate::cli::index_path(args.db))?;
    let filters = parse_pairs(&args.filters)?;

    let values = db.tag_values(&args.tag, &filters)?;
    if values.is_empty() {
        println!("No values recorded for tag '{}'.", args.tag);
        return Ok(());
    }
    for value in values {
        println!("{value}");
    }
    Ok(())
}
