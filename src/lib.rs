// src/lib.rs
//! Asynchronous recursive directory walker.
//!
//! `FileTreeWalker` visits every entry beneath a root directory, skipping
//! paths that contain an excluded substring, and hands decoded file content
//! to a file handler for files whose extension is allowed.

pub mod config;
pub mod error;
pub mod stats;
pub mod walker;

pub use config::{encoding_for_label, WalkerConfig};
pub use error::WalkError;
pub use stats::WalkStats;
pub use walker::{
    split_file_name, DirectoryVisit, EntryKind, FileSystem, FileTreeWalker, FileVisit,
    TokioFileSystem,
};

// Re-exported so callers can name encodings without a direct dependency
pub use encoding_rs;
