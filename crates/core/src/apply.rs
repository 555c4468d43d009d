use crate::error::ConflictError;
use crate::metadata::Candidate;
use crate::naming::{derive_path, suffixed_path};
use crate::paths::clean_absolute;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// How to treat a target path that is already occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Append `_001`, `_002`, ... to the file stem.
    #[default]
    Suffix,
    /// Abort the run.
    Fail,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub on_conflict: ConflictPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSummary {
    pub applied: usize,
    pub skipped: usize,
}

pub fn list_candidates(candidates: &[Candidate], out: &mut dyn Write) -> Result<()> {
    for candidate in candidates {
        writeln!(out, "{}", candidate.path.display())?;
    }
    Ok(())
}

/// Renames each candidate in place to its timestamp-derived name.
/// Stops at the first failed rename; earlier renames are kept.
pub fn rename_candidates(
    candidates: &[Candidate],
    options: &RunOptions,
    out: &mut dyn Write,
) -> Result<ActionSummary> {
    let mut reservations = Reservations::new(options.on_conflict);
    let mut summary = ActionSummary::default();

    for candidate in candidates {
        let planned = derive_path(&candidate.path, &candidate.taken);
        match reservations.resolve(&candidate.path, planned)? {
            Placement::AlreadyThere => skip_unchanged(&candidate.path, out, &mut summary)?,
            Placement::Target(target) => {
                relocate(&candidate.path, &target, options.dry_run, out, &mut summary)?
            }
        }
    }

    Ok(summary)
}

/// Moves each candidate into `target_dir`, keeping its file name. The
/// directory is prepared once, when the first movable candidate shows up.
pub fn move_candidates(
    candidates: &[Candidate],
    target_dir: &Path,
    options: &RunOptions,
    out: &mut dyn Write,
) -> Result<ActionSummary> {
    let target_dir = clean_absolute(target_dir).with_context(|| {
        format!(
            "failure converting target path {} to absolute path",
            target_dir.display()
        )
    })?;
    let mut reservations = Reservations::new(options.on_conflict);
    let mut summary = ActionSummary::default();
    let mut prepared = false;

    for candidate in candidates {
        let file_name = candidate
            .path
            .file_name()
            .with_context(|| format!("path has no file name: {}", candidate.path.display()))?;
        let planned = target_dir.join(file_name);
        let target = match reservations.resolve(&candidate.path, planned)? {
            Placement::AlreadyThere => {
                skip_unchanged(&candidate.path, out, &mut summary)?;
                continue;
            }
            Placement::Target(target) => target,
        };

        if !prepared {
            prepared = true;
            prepare_target_dir(&target_dir, options.dry_run, out)?;
        }

        relocate(&candidate.path, &target, options.dry_run, out, &mut summary)?;
    }

    Ok(summary)
}

enum Placement {
    AlreadyThere,
    Target(PathBuf),
}

/// Targets claimed so far in this run, and the paths vacated by earlier
/// candidates, so dry runs resolve collisions the same way a real run would.
struct Reservations {
    policy: ConflictPolicy,
    claimed: HashSet<PathBuf>,
    released: HashSet<PathBuf>,
}

impl Reservations {
    fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            claimed: HashSet::new(),
            released: HashSet::new(),
        }
    }

    fn resolve(&mut self, original: &Path, planned: PathBuf) -> Result<Placement> {
        if planned == original {
            return Ok(Placement::AlreadyThere);
        }
        if self.is_free(&planned) {
            return Ok(self.claim(original, planned));
        }

        if self.policy == ConflictPolicy::Fail {
            return Err(ConflictError::TargetExists {
                from: original.to_path_buf(),
                to: planned,
            }
            .into());
        }

        let mut n = 1usize;
        loop {
            let candidate = suffixed_path(&planned, n);
            if candidate == original {
                return Ok(Placement::AlreadyThere);
            }
            if self.is_free(&candidate) {
                info!(
                    "{} is taken, using {} for {}",
                    planned.display(),
                    candidate.display(),
                    original.display()
                );
                return Ok(self.claim(original, candidate));
            }
            n += 1;
        }
    }

    fn claim(&mut self, original: &Path, target: PathBuf) -> Placement {
        self.released.insert(original.to_path_buf());
        self.claimed.insert(target.clone());
        Placement::Target(target)
    }

    fn is_free(&self, path: &Path) -> bool {
        if self.claimed.contains(path) {
            return false;
        }
        self.released.contains(path) || fs::symlink_metadata(path).is_err()
    }
}

fn skip_unchanged(path: &Path, out: &mut dyn Write, summary: &mut ActionSummary) -> Result<()> {
    writeln!(out, "skipping: {} (old and new path match)", path.display())?;
    summary.skipped += 1;
    Ok(())
}

fn relocate(
    from: &Path,
    to: &Path,
    dry_run: bool,
    out: &mut dyn Write,
    summary: &mut ActionSummary,
) -> Result<()> {
    let message = format!("{} -> {}", from.display(), to.display());
    if dry_run {
        writeln!(out, "skipping: {} (dry run)", message)?;
        summary.skipped += 1;
        return Ok(());
    }

    fs::rename(from, to).with_context(|| format!("failure renaming path {}", message))?;
    writeln!(out, "{}", message)?;
    summary.applied += 1;
    Ok(())
}

fn prepare_target_dir(dir: &Path, dry_run: bool, out: &mut dyn Write) -> Result<()> {
    if dir.is_dir() {
        debug!("target directory {} already exists", dir.display());
        return Ok(());
    }
    if dry_run {
        writeln!(out, "skipping: make directory(s) {} (dry run)", dir.display())?;
        return Ok(());
    }

    create_target_dir(dir)
        .with_context(|| format!("failure creating dirs for path {}", dir.display()))?;
    info!("created directory {}", dir.display());
    Ok(())
}

/// Owner rwx, group and others r-x.
#[cfg(unix)]
fn create_target_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_target_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}
