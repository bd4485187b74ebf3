use std::path::{Component, Path, PathBuf};

use crate::{SaveStore, StoreError};

/// Lexically clean a client-supplied relative path.
///
/// Returns `None` when the path is absolute, carries a drive prefix, or uses `..`
/// to climb above its starting point.
pub(crate) fn normalize_relative(relative: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(clean)
}

/// What a resolved path is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expect {
    File,
    Dir,
}

/// A path that passed the guard: its canonical location plus the cleaned relative form.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub canonical: PathBuf,
    pub relative: PathBuf,
}

impl SaveStore {
    /// Canonical form of the configured root.
    pub(crate) fn canonical_root(&self) -> Result<PathBuf, StoreError> {
        self.root.canonicalize().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::RootMissing {
                    root: self.root.clone(),
                }
            } else {
                StoreError::Io {
                    path: self.root.clone(),
                    source,
                }
            }
        })
    }

    pub(crate) fn resolve_as(&self, relative: &str, expect: Expect) -> Result<Resolved, StoreError> {
        let clean = normalize_relative(relative).ok_or_else(|| {
            tracing::warn!(path = relative, "Rejected path escaping the saves root");
            StoreError::invalid(relative)
        })?;

        let root = self.canonical_root()?;
        let candidate = root.join(&clean);
        let canonical = candidate.canonicalize().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::not_found(relative)
            } else {
                StoreError::Io {
                    path: candidate.clone(),
                    source,
                }
            }
        })?;

        // Symlinks can still point outside after a clean lexical check.
        if !canonical.starts_with(&root) {
            tracing::warn!(
                path = relative,
                resolved = %canonical.display(),
                "Rejected path resolving outside the saves root"
            );
            return Err(StoreError::invalid(relative));
        }

        let matches = match expect {
            Expect::File => canonical.is_file(),
            Expect::Dir => canonical.is_dir(),
        };
        if !matches {
            return Err(StoreError::not_found(relative));
        }

        Ok(Resolved {
            canonical,
            relative: clean,
        })
    }

    /// Resolve a path relative to the root to the canonical location of an existing file.
    ///
    /// Fails with [`StoreError::InvalidPath`] when the path escapes the root, either
    /// lexically (`..`, absolute paths) or through symlinks, and with
    /// [`StoreError::NotFound`] when no such file exists.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        self.resolve_as(relative, Expect::File).map(|r| r.canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListingLimits;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SaveStore) {
        let dir = TempDir::new().unwrap();
        let saves = dir.path().join("saves");
        fs::create_dir_all(saves.join("run_a")).unwrap();
        fs::write(saves.join("run_a").join("step_01.json"), b"{}").unwrap();
        fs::write(dir.path().join("secret.json"), b"{\"secret\":true}").unwrap();
        let store = SaveStore::new(&saves, ListingLimits::default());
        (dir, store)
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("a/./b.json"), Some(PathBuf::from("a/b.json")));
        assert_eq!(normalize_relative("a/../b.json"), Some(PathBuf::from("b.json")));
        assert_eq!(normalize_relative("../b.json"), None);
        assert_eq!(normalize_relative("a/../../b.json"), None);
        assert_eq!(normalize_relative("/etc/passwd"), None);
    }

    #[test]
    fn test_resolve_valid_path() {
        let (_dir, store) = fixture();
        let resolved = store.resolve("run_a/step_01.json").unwrap();
        assert!(resolved.ends_with("run_a/step_01.json"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (_dir, store) = fixture();
        assert!(matches!(
            store.resolve("../secret.json"),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.resolve("run_a/../../secret.json"),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_absolute_path() {
        let (dir, store) = fixture();
        let absolute = dir.path().join("secret.json");
        assert!(matches!(
            store.resolve(&absolute.to_string_lossy()),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_resolve_missing_and_directory() {
        let (_dir, store) = fixture();
        assert!(matches!(
            store.resolve("run_a/nope.json"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(store.resolve("run_a"), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_missing_root_is_reported() {
        let dir = TempDir::new().unwrap();
        let store = SaveStore::new(dir.path().join("absent"), ListingLimits::default());
        assert!(matches!(
            store.resolve("a.json"),
            Err(StoreError::RootMissing { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rejects_symlink_escape() {
        let (dir, store) = fixture();
        std::os::unix::fs::symlink(
            dir.path().join("secret.json"),
            dir.path().join("saves").join("link.json"),
        )
        .unwrap();
        assert!(matches!(
            store.resolve("link.json"),
            Err(StoreError::InvalidPath { .. })
        ));
    }
}
