use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the save store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested path resolves outside the saves root.
    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Not found: {path}")]
    NotFound { path: String },

    /// The configured saves root itself does not exist.
    #[error("Saves root not found: {}", root.display())]
    RootMissing { root: PathBuf },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn invalid(path: &str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Map an I/O error, turning `ErrorKind::NotFound` into [`StoreError::NotFound`].
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_string_lossy().to_string(),
            }
        } else {
            Self::Io { path, source }
        }
    }
}
