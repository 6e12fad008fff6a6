// src/walker/mod.rs
// Recursive, concurrent directory traversal with file and directory callbacks

pub mod fs;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, trace, warn, Instrument};

use crate::config::WalkerConfig;
use crate::error::{Result, WalkError};
use crate::stats::{StatsCounter, WalkStats};

pub use fs::{EntryKind, FileSystem, TokioFileSystem};

/// A regular file that passed the filters, with its decoded content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVisit {
    /// Parent directory joined with the entry name
    pub path: PathBuf,
    /// File name without its extension
    pub name: String,
    /// Extension including the leading dot (`.txt`), or empty
    pub extension: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryVisit {
    pub path: PathBuf,
    /// Last path segment
    pub name: String,
}

type FileHandler = Box<dyn Fn(&FileVisit) + Send + Sync>;
type DirectoryHandler = Box<dyn Fn(&DirectoryVisit) + Send + Sync>;

/// Walks a directory tree, invoking `on_file` for every qualifying file and
/// `on_directory` for every subdirectory.
///
/// Sibling entries are processed concurrently and handlers may be invoked in
/// any order. Handlers receive no locking from the walker; shared state they
/// touch needs its own synchronization.
///
/// ```no_run
/// use file_tree_walker::FileTreeWalker;
///
/// # async fn run() -> Result<(), file_tree_walker::WalkError> {
/// let stats = FileTreeWalker::new()
///     .set_allowed_file_types(vec!["rs".to_string()])
///     .set_excluded_files(vec!["target".to_string()])
///     .on_file(|file| println!("{} ({} bytes)", file.path.display(), file.content.len()))
///     .walk(".")
///     .await?;
///
/// println!("visited {} files", stats.files_visited);
/// # Ok(())
/// # }
/// ```
pub struct FileTreeWalker<F = TokioFileSystem> {
    fs: F,
    config: WalkerConfig,
    on_file: Option<FileHandler>,
    on_directory: Option<DirectoryHandler>,
}

impl FileTreeWalker<TokioFileSystem> {
    pub fn new() -> Self {
        Self::with_file_system(TokioFileSystem)
    }
}

impl Default for FileTreeWalker<TokioFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> FileTreeWalker<F> {
    pub fn with_file_system(fs: F) -> Self {
        Self {
            fs,
            config: WalkerConfig::default(),
            on_file: None,
            on_directory: None,
        }
    }

    /// Register the file handler, replacing any previous one
    pub fn on_file<H>(mut self, handler: H) -> Self
    where
        H: Fn(&FileVisit) + Send + Sync + 'static,
    {
        self.on_file = Some(Box::new(handler));
        self
    }

    /// Register the directory handler, replacing any previous one
    pub fn on_directory<H>(mut self, handler: H) -> Self
    where
        H: Fn(&DirectoryVisit) + Send + Sync + 'static,
    {
        self.on_directory = Some(Box::new(handler));
        self
    }

    pub fn set_file_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.config.file_encoding = encoding;
        self
    }

    /// Paths containing any of these substrings are skipped. Excluded
    /// directories are not descended into.
    pub fn set_excluded_files(mut self, excluded_files: Vec<String>) -> Self {
        self.config.excluded_files = excluded_files;
        self
    }

    /// Extensions without the leading dot. Only restricts which files reach
    /// the file handler; directories are always descended into.
    pub fn set_allowed_file_types(mut self, allowed_file_types: Vec<String>) -> Self {
        self.config.allowed_file_types = allowed_file_types;
        self
    }

    pub fn set_max_concurrent_operations(mut self, limit: Option<usize>) -> Self {
        self.config.max_concurrent_operations = limit;
        self
    }

    pub fn with_config(mut self, config: WalkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Traverse everything beneath `root`.
    ///
    /// Resolves once every non-excluded entry has been processed, including
    /// all subtrees. The first listing, metadata or read failure aborts the
    /// walk; handlers that already ran are not undone.
    pub async fn walk<P: AsRef<Path>>(&self, root: P) -> Result<WalkStats> {
        let root = root.as_ref();
        let walk = Walk {
            walker: self,
            limiter: self.config.concurrency_limit().map(Semaphore::new),
            stats: StatsCounter::default(),
        };

        let span = tracing::debug_span!("walk", root = %root.display());
        match walk.directory(root.to_path_buf()).instrument(span).await {
            Ok(()) => {
                let stats = walk.stats.snapshot();
                debug!(
                    root = %root.display(),
                    directories = stats.directories_visited,
                    files = stats.files_visited,
                    excluded = stats.entries_excluded,
                    "walk complete"
                );
                Ok(stats)
            }
            Err(e) => {
                warn!(root = %root.display(), "walk failed: {}", e);
                Err(e)
            }
        }
    }
}

/// State of one `walk` call
struct Walk<'w, F> {
    walker: &'w FileTreeWalker<F>,
    limiter: Option<Semaphore>,
    stats: StatsCounter,
}

impl<F: FileSystem> Walk<'_, F> {
    /// Held only around a single filesystem call, never across recursion
    async fn permit(&self) -> Option<SemaphorePermit<'_>> {
        match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        }
    }

    fn directory<'a>(&'a self, directory: PathBuf) -> BoxFuture<'a, Result<()>> {
        async move {
            let names = {
                let _permit = self.permit().await;
                self.walker.fs.read_dir(&directory).await
            }
            .map_err(|source| WalkError::ReadDir {
                path: directory.clone(),
                source,
            })?;

            trace!(directory = %directory.display(), entries = names.len(), "listed directory");

            let mut pending: FuturesUnordered<_> = names
                .into_iter()
                .map(|name| self.entry(&directory, name))
                .collect();

            while let Some(result) = pending.next().await {
                result?;
            }

            Ok(())
        }
        .boxed()
    }

    async fn entry(&self, directory: &Path, file_name: OsString) -> Result<()> {
        let path = directory.join(&file_name);
        let config = &self.walker.config;

        if config.is_excluded(&path) {
            trace!(path = %path.display(), "excluded");
            self.stats.entry_excluded();
            return Ok(());
        }

        let kind = {
            let _permit = self.permit().await;
            self.walker.fs.entry_kind(&path).await
        }
        .map_err(|source| WalkError::Metadata {
            path: path.clone(),
            source,
        })?;

        let file_name = file_name.to_string_lossy().into_owned();

        match kind {
            EntryKind::Directory => {
                self.stats.directory_visited();
                if let Some(handler) = &self.walker.on_directory {
                    handler(&DirectoryVisit {
                        path: path.clone(),
                        name: file_name,
                    });
                }
                self.directory(path).await
            }
            EntryKind::File => self.file(path, &file_name).await,
            EntryKind::Other => {
                trace!(path = %path.display(), "skipping special file");
                self.stats.entry_skipped();
                Ok(())
            }
        }
    }

    async fn file(&self, path: PathBuf, file_name: &str) -> Result<()> {
        let config = &self.walker.config;
        let (name, extension) = split_file_name(file_name);

        if !config.is_allowed_extension(extension) {
            trace!(path = %path.display(), extension, "file type not allowed");
            self.stats.file_filtered();
            return Ok(());
        }

        self.stats.file_visited();

        // Content is only read when someone will receive it
        let Some(handler) = &self.walker.on_file else {
            return Ok(());
        };

        let bytes = {
            let _permit = self.permit().await;
            self.walker.fs.read(&path).await
        }
        .map_err(|source| WalkError::ReadFile {
            path: path.clone(),
            source,
        })?;
        self.stats.add_bytes(bytes.len());

        let (content, had_errors) = config.file_encoding.decode_without_bom_handling(&bytes);
        if had_errors {
            debug!(
                path = %path.display(),
                encoding = config.file_encoding.name(),
                "malformed sequences replaced while decoding"
            );
        }

        handler(&FileVisit {
            path,
            name: name.to_string(),
            extension: extension.to_string(),
            content: content.into_owned(),
        });

        Ok(())
    }
}

/// Split a file name into `(name, extension)` where the extension keeps its
/// leading dot. A dot in first position does not start an extension.
///
/// `file.txt` -> (`file`, `.txt`), `archive.tar.gz` -> (`archive.tar`, `.gz`),
/// `.gitignore` -> (`.gitignore`, ``), `README` -> (`README`, ``)
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    if file_name == ".." {
        return (file_name, "");
    }

    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(index) => file_name.split_at(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_extension() {
        assert_eq!(split_file_name("file.txt"), ("file", ".txt"));
        assert_eq!(split_file_name("file.ts"), ("file", ".ts"));
    }

    #[test]
    fn test_split_uses_last_dot() {
        assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_file_name(".eslintrc.json"), (".eslintrc", ".json"));
    }

    #[test]
    fn test_split_without_extension() {
        assert_eq!(split_file_name("README"), ("README", ""));
        assert_eq!(split_file_name("Makefile"), ("Makefile", ""));
    }

    #[test]
    fn test_split_dotfile() {
        assert_eq!(split_file_name(".gitignore"), (".gitignore", ""));
        assert_eq!(split_file_name(".."), ("..", ""));
    }

    #[test]
    fn test_split_trailing_dot() {
        assert_eq!(split_file_name("file."), ("file", "."));
    }

    #[test]
    fn test_split_matches_std_path() {
        for name in ["file.txt", "a.b.c", ".hidden", "noext", ".a.b", "x."] {
            let path = Path::new(name);
            let stem = path.file_stem().unwrap().to_str().unwrap();
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_str().unwrap()))
                .unwrap_or_default();

            assert_eq!(split_file_name(name), (stem, ext.as_str()), "{}", name);
        }
    }

    #[test]
    fn test_setters_replace_config() {
        let walker = FileTreeWalker::new()
            .set_file_encoding(encoding_rs::WINDOWS_1252)
            .set_excluded_files(vec!["target".to_string()])
            .set_allowed_file_types(vec!["rs".to_string()])
            .set_max_concurrent_operations(Some(4));

        let config = walker.config();
        assert_eq!(config.file_encoding, encoding_rs::WINDOWS_1252);
        assert_eq!(config.excluded_files, vec!["target"]);
        assert_eq!(config.allowed_file_types, vec!["rs"]);
        assert_eq!(config.max_concurrent_operations, Some(4));

        let walker = walker.with_config(WalkerConfig::default());
        assert_eq!(walker.config(), &WalkerConfig::default());
    }
}
