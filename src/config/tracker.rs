//! Bookkeeping of which files a resolution run has already visited.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The file whose `includes` entry caused another file to be loaded.
///
/// The root document of a run has no referencing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    Root,
    File(PathBuf),
}

impl Origin {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("<root>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Records every file registered during a run together with its first origin.
///
/// Entries are never removed, so a path can be registered at most once per run.
/// This rejects true cycles and diamond-shaped references alike.
#[derive(Debug, Default)]
pub struct InclusionTracker {
    visited: HashMap<PathBuf, Origin>,
}

impl InclusionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` as loaded by `origin`.
    ///
    /// Returns the origin recorded by the earlier registration if `path` was
    /// already present; the existing record is left untouched in that case.
    pub fn register(&mut self, origin: Origin, path: &Path) -> Option<Origin> {
        match self.visited.entry(path.to_path_buf()) {
            Entry::Occupied(previous) => Some(previous.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(origin);
                None
            }
        }
    }

    /// Number of distinct files registered so far.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }
}
