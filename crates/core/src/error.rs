use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to obtain a photo-taken timestamp from a single file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failure reading file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no embedded metadata block in container {}: {reason}", path.display())]
    UnsupportedContainer { path: PathBuf, reason: String },
    #[error("failure decoding metadata in {}: {reason}", path.display())]
    MetadataDecode { path: PathBuf, reason: String },
    #[error("metadata in {} carries no photo-taken timestamp", path.display())]
    MissingTimestamp { path: PathBuf },
}

impl ExtractError {
    pub fn path(&self) -> &Path {
        match self {
            ExtractError::Io { path, .. }
            | ExtractError::UnsupportedContainer { path, .. }
            | ExtractError::MetadataDecode { path, .. }
            | ExtractError::MissingTimestamp { path } => path,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("invalid timestamp {value:?}, expected YYYY-MM-DDThh:mm:ss")]
    InvalidTimestamp { value: String },
    #[error("--from {from} is after --to {to}")]
    InvertedRange { from: String, to: String },
    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("target path {} already exists, refusing to overwrite it with {}", to.display(), from.display())]
    TargetExists { from: PathBuf, to: PathBuf },
}
