// src/stats.rs
// Counters reported by a completed walk

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Statistics returned after a successful walk
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkStats {
    pub directories_visited: usize,
    /// Regular files that passed the extension allowlist
    pub files_visited: usize,
    /// Regular files rejected by the extension allowlist
    pub files_filtered: usize,
    /// Entries matching an excluded substring (their subtrees are not counted)
    pub entries_excluded: usize,
    /// Entries that are neither directories nor regular files
    pub entries_skipped: usize,
    pub bytes_read: u64,
}

/// Shared between the concurrent branches of a single walk
#[derive(Debug, Default)]
pub(crate) struct StatsCounter {
    directories_visited: AtomicUsize,
    files_visited: AtomicUsize,
    files_filtered: AtomicUsize,
    entries_excluded: AtomicUsize,
    entries_skipped: AtomicUsize,
    bytes_read: AtomicU64,
}

impl StatsCounter {
    pub fn directory_visited(&self) {
        self.directories_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_visited(&self) {
        self.files_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn file_filtered(&self) {
        self.files_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn entry_excluded(&self) {
        self.entries_excluded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn entry_skipped(&self) {
        self.entries_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes(&self, bytes: usize) {
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WalkStats {
        WalkStats {
            directories_visited: self.directories_visited.load(Ordering::Relaxed),
            files_visited: self.files_visited.load(Ordering::Relaxed),
            files_filtered: self.files_filtered.load(Ordering::Relaxed),
            entries_excluded: self.entries_excluded.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}
