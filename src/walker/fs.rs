// src/walker/fs.rs
// Filesystem primitives the walker depends on

use std::ffi::OsString;
use std::io;
use std::path::Path;

use async_trait::async_trait;

/// Classification of a directory entry after following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    /// Sockets, FIFOs, devices, dangling symlinks
    Other,
}

/// The three operations a walk needs from its host.
///
/// Implementations may fail with any `io::Error`; the walker maps each one to
/// the matching `WalkError` variant.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Names of the direct entries of `path`, without `.` and `..`
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>>;

    async fn entry_kind(&self, path: &Path) -> io::Result<EntryKind>;

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// `FileSystem` backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        let mut dir = tokio::fs::read_dir(path).await?;

        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name());
        }

        Ok(names)
    }

    async fn entry_kind(&self, path: &Path) -> io::Result<EntryKind> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // A dangling symlink is listed by read_dir but cannot be followed
                return match tokio::fs::symlink_metadata(path).await {
                    Ok(link) if link.file_type().is_symlink() => Ok(EntryKind::Other),
                    _ => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        Ok(if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        })
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
