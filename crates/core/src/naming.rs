use crate::classifier::lower_case_extension;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};

/// `YYYY-MM-DD_hh.mm.ss`, wall clock as encoded in the photo.
pub const NAME_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";

/// Timestamp-derived sibling of `original`. The extension is lower-cased.
pub fn derive_path(original: &Path, taken: &DateTime<FixedOffset>) -> PathBuf {
    let stem = taken.format(NAME_FORMAT).to_string();
    sibling(original, &stem, lower_case_extension(original).as_deref())
}

/// `<stem>_<n:03>.<ext>` next to `path`.
pub fn suffixed_path(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let ext = path.extension().map(|v| v.to_string_lossy().to_string());
    sibling(path, &format!("{}_{:03}", stem, n), ext.as_deref())
}

fn sibling(path: &Path, stem: &str, extension: Option<&str>) -> PathBuf {
    let mut name = stem.to_string();
    if let Some(ext) = extension.filter(|ext| !ext.is_empty()) {
        name.push('.');
        name.push_str(ext);
    }
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
