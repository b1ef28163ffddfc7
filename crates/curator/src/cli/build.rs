//! Build command - Build a path from tag values

use crate::cli::output::parse_pairs;
use anyhow::{bail, Result};
use curator::{Specification, TagValues};
use std::path::PathBuf;

/// Arguments for the build command
#[derive(Debug)]
pub struct BuildArgs {
    pub spec: PathBuf,
    pub tags: Vec<String>,
    pub strict: bool,
}

/// Execute the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let spec = Specification::from_yaml_file(&args.spec)?;
    let tags: TagValues = parse_pairs(&args.tags)?.into_iter().collect();

    let built = if args.strict {
        spec.build_path_strict(&tags)
    } else {
        spec.build_path(&tags)
    };

    match built {
        Some(path) => {
            println!("{path}");
            Ok(())
        }
        None => bail!("no valid path exists for the given tags"),
    }
}
