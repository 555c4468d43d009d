use std::io;
use std::path::{Component, Path, PathBuf};

/// Absolute form of `path` with `.` and `..` folded away lexically.
/// Symlinks are not resolved.
pub(crate) fn clean_absolute(path: &Path) -> io::Result<PathBuf> {
    Ok(clean(&std::path::absolute(path)?))
}

fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}
