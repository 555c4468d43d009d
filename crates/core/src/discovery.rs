use crate::classifier::ExtensionClassifier;
use crate::error::{ArgumentError, ExtractError};
use crate::exif_reader::extract_taken_time;
use crate::metadata::{Candidate, TimeRange};
use crate::paths::clean_absolute;
use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};
use std::vec;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Recursive walk, depth-first, siblings sorted by name.
    #[default]
    Walk,
    /// Each root is a glob pattern; only the matches themselves are visited.
    Glob,
}

/// What to do with a file whose extension matched but whose metadata could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionPolicy {
    #[default]
    Strict,
    SkipWithWarning,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub roots: Vec<PathBuf>,
    pub traversal: TraversalMode,
    pub range: TimeRange,
    pub on_extract_error: ExtractionPolicy,
    pub classifier: ExtensionClassifier,
}

#[derive(Debug)]
pub enum Filtration {
    Included(Candidate),
    /// Not a regular file, or an extension outside the allow-list.
    Ignored(PathBuf),
    OutOfRange(Candidate),
    Unreadable(ExtractError),
}

#[derive(Debug, Clone, Default)]
struct ScanStats {
    visited: usize,
    ignored: usize,
    out_of_range: usize,
    unreadable: usize,
    matched: usize,
}

/// Starts a lazy scan over the configured roots. Each item is consumed once.
pub fn scan(options: &DiscoveryOptions) -> Result<Scan<'_>> {
    let roots = resolve_roots(&options.roots, options.traversal)?;
    Ok(Scan {
        classifier: &options.classifier,
        range: options.range,
        traversal: options.traversal,
        roots: roots.into_iter(),
        current: None,
    })
}

pub fn find_candidates(options: &DiscoveryOptions) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    let mut stats = ScanStats::default();

    for item in scan(options)? {
        stats.visited += 1;
        match item? {
            Filtration::Included(candidate) => {
                debug!("matched {} ({})", candidate.path.display(), candidate.taken);
                stats.matched += 1;
                candidates.push(candidate);
            }
            Filtration::Ignored(path) => {
                trace!("ignoring {}", path.display());
                stats.ignored += 1;
            }
            Filtration::OutOfRange(candidate) => {
                debug!(
                    "outside time range: {} ({})",
                    candidate.path.display(),
                    candidate.taken
                );
                stats.out_of_range += 1;
            }
            Filtration::Unreadable(err) => match options.on_extract_error {
                ExtractionPolicy::Strict => {
                    let path = err.path().display().to_string();
                    return Err(anyhow::Error::new(err).context(format!(
                        "failure obtaining photo-taken-time from path {}",
                        path
                    )));
                }
                ExtractionPolicy::SkipWithWarning => {
                    warn!("skipping {}: {}", err.path().display(), err);
                    stats.unreadable += 1;
                }
            },
        }
    }

    info!(
        "scan: visited={} matched={} ignored={} out_of_range={} unreadable={}",
        stats.visited, stats.matched, stats.ignored, stats.out_of_range, stats.unreadable
    );
    Ok(candidates)
}

fn resolve_roots(roots: &[PathBuf], traversal: TraversalMode) -> Result<Vec<PathBuf>> {
    if roots.is_empty() {
        let cwd = std::env::current_dir().context("failure resolving the working directory")?;
        return Ok(vec![match traversal {
            TraversalMode::Walk => cwd,
            TraversalMode::Glob => cwd.join("*"),
        }]);
    }

    roots
        .iter()
        .map(|root| {
            clean_absolute(root).with_context(|| {
                format!("failure converting path {} to absolute path", root.display())
            })
        })
        .collect()
}

pub struct Scan<'a> {
    classifier: &'a ExtensionClassifier,
    range: TimeRange,
    traversal: TraversalMode,
    roots: vec::IntoIter<PathBuf>,
    current: Option<Entries>,
}

impl Scan<'_> {
    fn classify(&self, path: PathBuf, file_type: FileType) -> Filtration {
        if !self.classifier.is_candidate(&path, file_type) {
            return Filtration::Ignored(path);
        }
        match extract_taken_time(&path) {
            Ok(taken) => {
                let candidate = Candidate { path, taken };
                if self.range.contains(&candidate.taken) {
                    Filtration::Included(candidate)
                } else {
                    Filtration::OutOfRange(candidate)
                }
            }
            Err(err) => Filtration::Unreadable(err),
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<Filtration>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = self.current.as_mut() {
                match entries.next_entry() {
                    Some(Ok((path, file_type))) => return Some(Ok(self.classify(path, file_type))),
                    Some(Err(err)) => return Some(Err(err)),
                    None => self.current = None,
                }
            }

            let root = self.roots.next()?;
            debug!("scanning {}", root.display());
            match Entries::open(root, self.traversal) {
                Ok(entries) => self.current = Some(entries),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

enum Entries {
    Walk {
        root: PathBuf,
        walker: walkdir::IntoIter,
    },
    Glob(glob::Paths),
}

impl Entries {
    fn open(root: PathBuf, traversal: TraversalMode) -> Result<Self> {
        match traversal {
            TraversalMode::Walk => Ok(Entries::Walk {
                walker: WalkDir::new(&root).sort_by_file_name().into_iter(),
                root,
            }),
            TraversalMode::Glob => {
                let pattern = root
                    .to_str()
                    .ok_or_else(|| ArgumentError::NonUtf8Path { path: root.clone() })?;
                let paths = glob::glob(pattern).with_context(|| {
                    format!("failure converting path {} to glob matches", pattern)
                })?;
                Ok(Entries::Glob(paths))
            }
        }
    }

    fn next_entry(&mut self) -> Option<Result<(PathBuf, FileType)>> {
        match self {
            Entries::Walk { root, walker } => {
                let entry = walker.next()?;
                Some(
                    entry
                        .map(|entry| (entry.path().to_path_buf(), entry.file_type()))
                        .with_context(|| format!("failure walking directory {}", root.display())),
                )
            }
            Entries::Glob(paths) => {
                let matched = paths.next()?;
                Some(
                    matched
                        .context("failure reading glob match")
                        .and_then(|path| stat(&path).map(|file_type| (path, file_type))),
                )
            }
        }
    }
}

fn stat(path: &Path) -> Result<FileType> {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type())
        .with_context(|| format!("failure obtaining Stat info from path {}", path.display()))
}
