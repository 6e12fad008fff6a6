// src/config/mod.rs
// Walker configuration: text encoding, excluded path substrings, extension allowlist

use std::path::Path;

use anyhow::Context;
use encoding_rs::{Encoding, UTF_16LE, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WalkError;

/// Settings read by `FileTreeWalker::walk`.
///
/// Loadable from TOML, e.g.
///
/// ```toml
/// file_encoding = "utf-8"
/// excluded_files = ["node_modules", ".git"]
/// allowed_file_types = ["ts", "tsx"]
/// max_concurrent_operations = 64
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Decoding applied to file content before it reaches the file handler
    #[serde(with = "encoding_label")]
    pub file_encoding: &'static Encoding,

    /// A joined path containing any of these substrings is skipped, along with
    /// everything beneath it
    pub excluded_files: Vec<String>,

    /// Extensions without the leading dot. Empty allows every extension.
    pub allowed_file_types: Vec<String>,

    /// Upper bound on in-flight filesystem operations. `None` or `Some(0)` means
    /// no bound.
    pub max_concurrent_operations: Option<usize>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            file_encoding: UTF_8,
            excluded_files: Vec::new(),
            allowed_file_types: Vec::new(),
            max_concurrent_operations: None,
        }
    }
}

impl WalkerConfig {
    /// Parse a configuration from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Failed to parse walker configuration")
    }

    /// Read and parse a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read walker configuration {}", path.display()))?;

        let config = Self::from_toml_str(&source)
            .with_context(|| format!("Invalid walker configuration in {}", path.display()))?;

        debug!(path = %path.display(), "Loaded walker configuration");
        Ok(config)
    }

    /// Substring containment against the lossy string form of `path`.
    ///
    /// `"src/gen"` excludes `src/gen`, `src/generated` and `src/gen/x.rs` alike.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded_files.is_empty() {
            return false;
        }

        let path = path.to_string_lossy();
        self.excluded_files
            .iter()
            .any(|excluded| path.contains(excluded.as_str()))
    }

    /// `extension` carries its leading dot (`.rs`), allowlist entries do not (`rs`)
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        if self.allowed_file_types.is_empty() {
            return true;
        }

        let bare = extension.strip_prefix('.').unwrap_or(extension);
        self.allowed_file_types.iter().any(|allowed| allowed == bare)
    }

    pub(crate) fn concurrency_limit(&self) -> Option<usize> {
        self.max_concurrent_operations.filter(|limit| *limit > 0)
    }
}

/// Look up an encoding by its WHATWG label (`utf-8`, `utf8`, `latin1`, `shift_jis`, ...).
///
/// Node's buffer encoding names with no WHATWG label are accepted too:
/// `utf16le` and `ucs2` map to UTF-16LE, `binary` maps to windows-1252.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, WalkError> {
    let trimmed = label.trim();

    match trimmed.to_ascii_lowercase().as_str() {
        "utf16le" | "ucs2" | "ucs-2" => return Ok(UTF_16LE),
        "binary" => return Ok(WINDOWS_1252),
        _ => {}
    }

    Encoding::for_label(trimmed.as_bytes())
        .ok_or_else(|| WalkError::UnknownEncoding(label.to_string()))
}

mod encoding_label {
    use encoding_rs::Encoding;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        encoding: &&'static Encoding,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(encoding.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<&'static Encoding, D::Error> {
        let label = String::deserialize(deserializer)?;
        super::encoding_for_label(&label).map_err(de::Error::custom)
    }
}
