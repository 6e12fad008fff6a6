// src/error.rs
// Error types for directory traversal

use std::io;
use std::path::{Path, PathBuf};

/// Failure of a `walk` call.
///
/// Any of the filesystem variants means the traversal did not complete.
/// Callbacks that already ran before the failure are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("failed to list directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read metadata for {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown file encoding: {0}")]
    UnknownEncoding(String),
}

impl WalkError {
    /// Path of the entry whose filesystem operation failed
    pub fn path(&self) -> Option<&Path> {
        match self {
            WalkError::ReadDir { path, .. }
            | WalkError::Metadata { path, .. }
            | WalkError::ReadFile { path, .. } => Some(path),
            WalkError::UnknownEncoding(_) => None,
        }
    }

    /// Underlying OS error kind, if the failure came from the filesystem
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            WalkError::ReadDir { source, .. }
            | WalkError::Metadata { source, .. }
            | WalkError::ReadFile { source, .. } => Some(source.kind()),
            WalkError::UnknownEncoding(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_dir_error_exposes_path_and_kind() {
        let err = WalkError::ReadDir {
            path: PathBuf::from("missing"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };

        assert_eq!(err.path(), Some(Path::new("missing")));
        assert_eq!(err.kind(), Some(io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("failed to list directory missing"));
    }

    #[test]
    fn test_unknown_encoding_has_no_path() {
        let err = WalkError::UnknownEncoding("klingon".to_string());

        assert!(err.path().is_none());
        assert!(err.kind().is_none());
        assert_eq!(err.to_string(), "unknown file encoding: klingon");
    }
}
