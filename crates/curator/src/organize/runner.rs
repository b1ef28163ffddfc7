//! Batch organize runner
//!
//! Walks the source tree, selects candidates with the rule's glob, infers
//! tags per file and copies each file to the path the destination
//! specification builds. Failures are per-file: the file is recorded as
//! skipped with a diagnostic and the batch continues.

use super::lookup::LookupSet;
use super::pipeline::infer_tags;
use super::rules::{OrganizeRules, Position, TagRule};
use crate::error::{CuratorError, Result};
use crate::spec::{Specification, TagValues};
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Outcome of one organize run
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Source/destination pairs that were organized
    pub organized: Vec<(PathBuf, PathBuf)>,
    /// Files that could not be organized, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Fellow files copied alongside organized files
    pub fellows: usize,
    /// Addition files placed next to or inside organized files
    pub additions: usize,
}

/// Organizes source trees against a destination specification
pub struct Organizer<'s> {
    spec: &'s Specification,
    dry_run: bool,
}

impl<'s> Organizer<'s> {
    pub fn new(spec: &'s Specification) -> Self {
        Self {
            spec,
            dry_run: false,
        }
    }

    /// Walk the whole pipeline without touching the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run one organization-rules document.
    pub fn organize(&self, rules: &OrganizeRules) -> Result<OrganizeReport> {
        if !rules.source.is_dir() {
            return Err(CuratorError::Config(format!(
                "organize source is not a directory: {}",
                rules.source.display()
            )));
        }

        let tag_rules: Vec<TagRule> = rules
            .tag_rules
            .iter()
            .map(|r| r.compile())
            .collect::<Result<_>>()?;
        let lookups = load_lookups(rules, &tag_rules)?;
        let rename_rules = compile_rename_rules(rules)?;
        let matcher = build_matcher(&rules.pattern)?;

        info!(
            source = %rules.source.display(),
            destination = %rules.destination.display(),
            spec = self.spec.name(),
            dry_run = self.dry_run,
            "organizing"
        );
        if rules.overwrite {
            warn!("overwrite set: existing destination files will be replaced");
        }
        for addition in &rules.add {
            info!(path = %addition.path.display(), position = ?addition.position, "addition registered");
        }

        let mut report = OrganizeReport::default();
        for (file, rel) in candidates(&rules.source, &matcher, &rules.skip)? {
            debug!(file = %rel, "candidate matched");
            let tags = infer_tags(&rel, &tag_rules, &lookups);

            let built = match self.resolve_destination(&rel, &tags) {
                Ok(built) => built,
                Err(e) => {
                    error!(file = %rel, error = %e, "cannot build destination path");
                    report.skipped.push((file, e.to_string()));
                    continue;
                }
            };
            let dest = rules.destination.join(&built);
            info!(file = %rel, dest = %dest.display(), "organizing file");

            match self.copy(&file, &dest, rules.overwrite) {
                Ok(true) => report.organized.push((file.clone(), dest.clone())),
                Ok(false) => {
                    report
                        .skipped
                        .push((file, "destination exists".to_string()));
                    continue;
                }
                Err(e) => {
                    error!(file = %rel, error = %e, "copy failed");
                    report.skipped.push((file, e.to_string()));
                    continue;
                }
            }

            self.place_additions(rules, &dest, &mut report);

            if rules.copy_fellows {
                self.copy_fellows(rules, &file, &tags, &rename_rules, &mut report);
            }
        }

        info!(
            organized = report.organized.len(),
            skipped = report.skipped.len(),
            fellows = report.fellows,
            additions = report.additions,
            "organize complete"
        );
        Ok(report)
    }

    /// Build the relative destination path, turning a failed build into
    /// the per-file error that organize() recovers from.
    fn resolve_destination(&self, rel: &str, tags: &TagValues) -> Result<String> {
        if let Some(built) = self.spec.build_path(tags) {
            return Ok(built);
        }
        let missing = self.spec.missing_mandatory(tags);
        if missing.is_empty() {
            Err(CuratorError::NoDestination(rel.to_string()))
        } else {
            Err(CuratorError::UnresolvedTag {
                tag: missing.join(", "),
                path: rel.to_string(),
            })
        }
    }

    /// Copy additions next to (`fellow`) or inside (`content`) the
    /// organized file's built path.
    fn place_additions(&self, rules: &OrganizeRules, dest: &Path, report: &mut OrganizeReport) {
        for addition in &rules.add {
            let target = match addition.position {
                Position::Content => match addition.path.file_name() {
                    Some(name) => dest.join(name),
                    None => continue,
                },
                Position::Fellow => {
                    let Some(parent) = dest.parent() else {
                        continue;
                    };
                    // A relative addition path may carry subdirectories;
                    // an absolute one contributes only its file name.
                    if addition.path.is_relative() {
                        parent.join(&addition.path)
                    } else {
                        match addition.path.file_name() {
                            Some(name) => parent.join(name),
                            None => continue,
                        }
                    }
                }
            };
            match self.copy(&addition.path, &target, rules.overwrite) {
                Ok(true) => {
                    info!(path = %target.display(), "addition placed");
                    report.additions += 1;
                }
                Ok(false) => {}
                Err(e) => error!(path = %addition.path.display(), error = %e, "addition failed"),
            }
        }
    }

    /// Copy sibling files through the builder with adjusted tags.
    fn copy_fellows(
        &self,
        rules: &OrganizeRules,
        file: &Path,
        tags: &TagValues,
        rename_rules: &[(Regex, String)],
        report: &mut OrganizeReport,
    ) {
        let Some(dir) = file.parent() else {
            return;
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "cannot list fellows");
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let fellow = entry.path();
            if fellow == *file || fellow.is_dir() {
                continue;
            }
            let fellow_name = fellow.to_string_lossy().replace('\\', "/");
            info!(fellow = %fellow.display(), "copying fellow");

            let mut fellow_tags = tags.clone();
            match fellow.extension().and_then(|e| e.to_str()) {
                Some(ext) => {
                    fellow_tags.insert("extension".to_string(), format!(".{ext}"));
                }
                None => {
                    fellow_tags.remove("extension");
                }
            }
            for (target, suffix) in rename_rules {
                if target.is_match(&fellow_name) {
                    debug!(fellow = %fellow.display(), suffix = suffix.as_str(), "suffix tag set");
                    fellow_tags.insert("suffix".to_string(), suffix.clone());
                }
            }

            let Some(built) = self.spec.build_path(&fellow_tags) else {
                error!(fellow = %fellow.display(), "cannot build destination path for fellow");
                report
                    .skipped
                    .push((fellow, "no destination path for fellow".to_string()));
                continue;
            };
            let dest = rules.destination.join(&built);
            match self.copy(&fellow, &dest, rules.overwrite) {
                Ok(true) => report.fellows += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(fellow = %fellow.display(), error = %e, "fellow copy failed");
                    report.skipped.push((fellow, e.to_string()));
                }
            }
        }
    }

    /// Copy one file, creating parent directories. Returns false when the
    /// destination exists and overwrite is off.
    fn copy(&self, src: &Path, dest: &Path, overwrite: bool) -> io::Result<bool> {
        if dest.exists() {
            if !overwrite {
                warn!(dest = %dest.display(), "destination exists; skipping copy");
                return Ok(false);
            }
            warn!(dest = %dest.display(), "overwriting existing destination");
        }
        if self.dry_run {
            info!(src = %src.display(), dest = %dest.display(), "dry run: would copy");
            return Ok(true);
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dest)?;
        Ok(true)
    }
}

/// Collect candidate files under the source root: regular files whose
/// forward-slash relative path matches the glob and is not skipped.
/// Sorted so runs are deterministic.
fn candidates(
    root: &Path,
    matcher: &GlobMatcher,
    skip: &[String],
) -> Result<Vec<(PathBuf, String)>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = relative_path(root, entry.path());
        if !matcher.is_match(&rel) || is_skipped(&rel, skip) {
            continue;
        }
        out.push((entry.into_path(), rel));
    }
    out.sort();
    Ok(out)
}

/// Normalize a path relative to `root` to forward slashes so globs and
/// captures behave the same on every platform.
pub(crate) fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_skipped(rel: &str, skip: &[String]) -> bool {
    skip.iter().any(|s| {
        let s = s.trim_end_matches('/');
        rel == s || rel.starts_with(&format!("{s}/"))
    })
}

/// Normalize a candidate glob: empty or `*` matches everything, and a
/// bare name matches at any depth.
pub(crate) fn normalize_pattern(raw: &str) -> String {
    let mut pattern = raw.trim().trim_start_matches('/').to_string();
    if pattern.is_empty() || pattern == "*" {
        pattern = "**/*".to_string();
    }
    if !pattern.contains('/') && !pattern.starts_with("**/") {
        pattern = format!("**/{pattern}");
    }
    pattern
}

fn build_matcher(raw: &str) -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(&normalize_pattern(raw))
        .case_insensitive(true)
        .build()?
        .compile_matcher())
}

fn load_lookups(rules: &OrganizeRules, tag_rules: &[TagRule]) -> Result<LookupSet> {
    let pairs: Vec<(String, String)> = tag_rules
        .iter()
        .filter_map(|r| r.replace.as_ref())
        .map(|r| (r.from.clone(), r.to.clone()))
        .collect();
    if pairs.is_empty() {
        return Ok(LookupSet::default());
    }
    let path = rules.map.as_ref().ok_or_else(|| {
        CuratorError::Config("replace rules require a 'map' lookup table".to_string())
    })?;
    LookupSet::load(path, &pairs)
}

fn compile_rename_rules(rules: &OrganizeRules) -> Result<Vec<(Regex, String)>> {
    rules
        .rename_rules
        .iter()
        .map(|r| Ok((Regex::new(&r.target)?, r.suffix.clone())))
        .collect()
}
