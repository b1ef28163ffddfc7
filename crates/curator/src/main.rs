//! Curator command-line interface
//!
//! Thin dispatch over the library: inspect specifications, match and
//! build paths, run organize batches and maintain the file-tag index.

use clap::{Parser, Subcommand};
use curator_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "curator",
    about = "Organize and index datasets against a path-pattern specification",
    version
)]
struct Cli {
    /// Verbose console logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect and validate a specification file
    Spec {
        /// Specification YAML file
        file: PathBuf,
    },
    /// Extract tags from a path
    Match {
        /// Specification YAML file
        spec: PathBuf,
        /// Path to match against the specification's templates
        path: String,
    },
    /// Build a path from tag values
    Build {
        /// Specification YAML file
        spec: PathBuf,
        /// Tag values as NAME=VALUE
        #[arg(short, long = "tag", value_name = "NAME=VALUE")]
        tags: Vec<String>,
        /// Skip templates that do not reference every supplied tag
        #[arg(long)]
        strict: bool,
    },
    /// Organize source trees using rule documents
    Organize {
        /// Specification YAML file describing the destination layout
        spec: PathBuf,
        /// Organization-rules YAML file
        rules: PathBuf,
        /// Walk the whole pipeline without copying anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Index a layout root into the file-tag store
    Index {
        /// Specification YAML file
        spec: PathBuf,
        /// Layout root directory
        root: PathBuf,
        /// Index database path (default: ~/.curator/index.sqlite3)
        #[arg(long)]
        db: Option<PathBuf>,
        /// Also index files that match no template
        #[arg(long)]
        all: bool,
    },
    /// Query indexed files by tag filters
    Files {
        /// Filters as NAME=VALUE
        #[arg(short, long = "filter", value_name = "NAME=VALUE")]
        filters: Vec<String>,
        /// Restrict to one layout root
        #[arg(long)]
        root: Option<PathBuf>,
        /// Index database path (default: ~/.curator/index.sqlite3)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List the distinct values of a tag
    Values {
        /// Tag name
        tag: String,
        /// Filters as NAME=VALUE
        #[arg(short, long = "filter", value_name = "NAME=VALUE")]
        filters: Vec<String>,
        /// Index database path (default: ~/.curator/index.sqlite3)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(e) = init_logging(LogConfig {
        app_name: "curator",
        verbose: args.verbose,
    }) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = match args.command {
        Command::Spec { file } => cli::spec::run(cli::spec::SpecArgs { file }),
        Command::Match { spec, path } => {
            cli::match_path::run(cli::match_path::MatchArgs { spec, path })
        }
        Command::Build { spec, tags, strict } => {
            cli::build::run(cli::build::BuildArgs { spec, tags, strict })
        }
        Command::Organize {
            spec,
            rules,
            dry_run,
        } => cli::organize::run(cli::organize::OrganizeArgs {
            spec,
            rules,
            dry_run,
        }),
        Command::Index {
            spec,
            root,
            db,
            all,
        } => cli::index::run(cli::index::IndexArgs {
            spec,
            root,
            db,
            all,
        }),
        Command::Files { filters, root, db } => {
            cli::files::run(cli::files::FilesArgs { db, filters, root })
        }
        Command::Values { tag, filters, db } => {
            cli::values::run(cli::values::ValuesArgs { tag, db, filters })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}
