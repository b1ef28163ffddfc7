//! Organize command - Run organization-rules documents against a source tree

use crate::cli::output::print_table;
use anyhow::{bail, Context, Result};
use curator::config::{load_documents, Document};
use curator::{Organizer, Specification};
use std::path::PathBuf;

/// Arguments for the organize command
#[derive(Debug)]
pub struct OrganizeArgs {
    pub spec: PathBuf,
    pub rules: PathBuf,
    pub dry_run: bool,
}

/// Execute the organize command
pub fn run(args: OrganizeArgs) -> Result<()> {
    let spec = Specification::from_yaml_file(&args.spec)?;
    let documents = load_documents(&args.rules)
        .with_context(|| format!("Failed to load {}", args.rules.display()))?;
    let organizer = Organizer::new(&spec).with_dry_run(args.dry_run);

    let mut ran = 0usize;
    for document in documents {
        let Document::Organize(rules) = document else {
            continue;
        };
        let report = organizer.organize(&rules)?;
        ran += 1;

        println!(
            "{}{} file(s) organized, {} skipped, {} fellow(s), {} addition(s)",
            if args.dry_run { "[dry run] " } else { "" },
            report.organized.len(),
            report.skipped.len(),
            report.fellows,
            report.additions
        );
        if !report.skipped.is_empty() {
            print_table(
                &["Skipped", "Reason"],
                report
                    .skipped
                    .iter()
                    .map(|(path, reason)| vec![path.display().to_string(), reason.clone()])
                    .collect(),
            );
        }
    }

    if ran == 0 {
        bail!(
            "no organization-rules documents in {}",
            args.rules.display()
        );
    }
    Ok(())
}
