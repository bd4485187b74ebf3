pub mod entry;
pub mod error;
pub mod guard;
pub mod listing;
pub mod reader;

pub use entry::SaveEntry;
pub use error::StoreError;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bounds on the recursive save walk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingLimits {
    pub max_depth: usize,
    pub max_files: usize,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_files: 10_000,
        }
    }
}

/// Read-only view over a directory of JSON save files.
///
/// Every path handed to the store is relative to `root` and is rejected if it
/// resolves anywhere outside it. Nothing is cached: each call hits the file system.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
    limits: ListingLimits,
}

impl SaveStore {
    pub fn new(root: impl Into<PathBuf>, limits: ListingLimits) -> Self {
        Self {
            root: root.into(),
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }
}
