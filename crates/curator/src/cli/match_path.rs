//! Match command - Extract tags from a path

use crate::cli::output::print_table;
use anyhow::{bail, Result};
use curator::Specification;
use std::path::PathBuf;

/// Arguments for the match command
#[derive(Debug)]
pub struct MatchArgs {
    pub spec: PathBuf,
    pub path: String,
}

/// Execute the match command
pub fn run(args: MatchArgs) -> Result<()> {
    let spec = Specification::from_yaml_file(&args.spec)?;
    match spec.match_path(&args.path) {
        Some(tags) => {
            print_table(
                &["Tag", "Value"],
                tags.iter()
                    .map(|(name, value)| vec![name.clone(), value.clone()])
                    .collect(),
            );
            Ok(())
        }
        None => bail!(
            "path does not match any template of '{}': {}",
            spec.name(),
            args.path
        ),
    }
}
