//! Spec command - Inspect and validate a specification file
//!
//! Compiles every document in the file so malformed tag patterns,
//! templates and rules surface with their diagnostics instead of
//! failing later mid-run.

use crate::cli::output::print_table;
use anyhow::{Context, Result};
use curator::config::{load_documents, Document};
use curator::Specification;
use std::path::PathBuf;

/// Arguments for the spec command
#[derive(Debug)]
pub struct SpecArgs {
    pub file: PathBuf,
}

/// Execute the spec command
pub fn run(args: SpecArgs) -> Result<()> {
    let documents = load_documents(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let stem = args
        .file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("specification")
        .to_string();

    let total = documents.len();
    for (i, document) in documents.into_iter().enumerate() {
        match document {
            Document::Specification(config) => {
                let spec = Specification::from_config(&stem, config)
                    .with_context(|| format!("document {} is invalid", i + 1))?;
                println!("Specification '{}'", spec.name());
                print_table(
                    &["Tag", "Pattern"],
                    spec.registry()
                        .iter()
                        .map(|t| vec![t.name().to_string(), t.pattern().to_string()])
                        .collect(),
                );
                println!("Path patterns:");
                for template in spec.templates() {
                    println!("  {}", template.source());
                }
            }
            Document::Organize(rules) => {
                for rule in &rules.tag_rules {
                    rule.compile()
                        .with_context(|| format!("document {} is invalid", i + 1))?;
                }
                println!(
                    "Organize rules: {} -> {} (pattern '{}', {} tag rule(s))",
                    rules.source.display(),
                    rules.destination.display(),
                    rules.pattern,
                    rules.tag_rules.len()
                );
            }
        }
    }

    println!("OK: {total} document(s)");
    Ok(())
}
