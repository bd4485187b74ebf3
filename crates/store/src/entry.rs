use serde::{Deserialize, Serialize};
use std::path::Path;

/// A JSON save file, or a folder holding save files, addressed relative to the saves root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEntry {
    pub name: String,
    pub path: String,
}

impl SaveEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Build an entry from a path relative to the root. Components are joined with `/`
    /// so listings look the same on every platform.
    pub(crate) fn from_relative(relative: &Path) -> Self {
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            path: join_components(relative),
        }
    }

    pub fn is_final_export(&self) -> bool {
        self.name.starts_with("step_") && self.name.ends_with("_final_export.json")
    }
}

pub(crate) fn join_components(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}
