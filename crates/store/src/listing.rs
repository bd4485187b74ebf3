use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::entry::{is_json, join_components};
use crate::guard::Expect;
use crate::{SaveEntry, SaveStore, StoreError};

impl SaveStore {
    /// List save files.
    ///
    /// Without a folder this walks the whole root (bounded by the store's
    /// [`ListingLimits`](crate::ListingLimits)) and returns every `.json` file.
    /// With a folder it returns only the `.json` files directly inside it.
    pub fn list_entries(&self, folder: Option<&str>) -> Result<Vec<SaveEntry>, StoreError> {
        match folder {
            Some(folder) => Ok(self
                .folder_files(folder)?
                .into_iter()
                .map(|(entry, _)| entry)
                .collect()),
            None => self.list_recursive(),
        }
    }

    /// Immediate subdirectories of the root that hold at least one `.json` file.
    pub fn list_folders(&self) -> Result<Vec<SaveEntry>, StoreError> {
        let root = self.canonical_root()?;
        let mut folders = Vec::new();

        for item in read_dir(&root)? {
            let path = item.path();
            let is_dir = item.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir || !contains_json(&path) {
                continue;
            }
            let name = item.file_name().to_string_lossy().to_string();
            folders.push(SaveEntry::new(name.clone(), name));
        }

        folders.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(count = folders.len(), "Listed save folders");
        Ok(folders)
    }

    /// Pick the save a folder should be viewed through: the last
    /// `step_*_final_export.json` by name, otherwise the most recently modified file.
    pub fn latest_entry(&self, folder: &str) -> Result<SaveEntry, StoreError> {
        let files = self.folder_files(folder)?;

        if let Some((entry, _)) = files
            .iter()
            .filter(|(entry, _)| entry.is_final_export())
            .max_by(|a, b| a.0.name.cmp(&b.0.name))
        {
            return Ok(entry.clone());
        }

        files
            .into_iter()
            .map(|(entry, path)| {
                let modified = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, entry)
            })
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)))
            .map(|(_, entry)| entry)
            .ok_or_else(|| StoreError::not_found(folder))
    }

    fn list_recursive(&self) -> Result<Vec<SaveEntry>, StoreError> {
        let root = self.canonical_root()?;
        let mut entries = Vec::new();

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .max_depth(self.limits.max_depth)
            .sort_by_file_name();

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry under saves root");
                    continue;
                }
            };

            if !item.file_type().is_file() || !is_json(item.path()) {
                continue;
            }

            if entries.len() >= self.limits.max_files {
                tracing::warn!(
                    max_files = self.limits.max_files,
                    "Save listing truncated at file limit"
                );
                break;
            }

            let relative = item.path().strip_prefix(&root).unwrap_or(item.path());
            entries.push(SaveEntry::from_relative(relative));
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(count = entries.len(), "Listed save files");
        Ok(entries)
    }

    /// `.json` files directly inside a folder, with their canonical paths.
    fn folder_files(&self, folder: &str) -> Result<Vec<(SaveEntry, PathBuf)>, StoreError> {
        let resolved = self.resolve_as(folder, Expect::Dir)?;
        let mut files = Vec::new();

        for item in read_dir(&resolved.canonical)? {
            let path = item.path();
            let is_file = item.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file || !is_json(&path) {
                continue;
            }
            let relative = resolved.relative.join(item.file_name());
            files.push((SaveEntry::from_relative(&relative), path));
        }

        files.sort_by(|a, b| a.0.path.cmp(&b.0.path));
        tracing::debug!(
            folder = %join_components(&resolved.relative),
            count = files.len(),
            "Listed folder"
        );
        Ok(files)
    }
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::from_io(dir, e))?;
    Ok(entries.filter_map(|e| e.ok()).collect())
}

fn contains_json(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).any(|e| {
            e.file_type().map(|t| t.is_file()).unwrap_or(false) && is_json(&e.path())
        }),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListingLimits;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SaveStore) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("run_a")).unwrap();
        fs::create_dir_all(root.join("run_b/nested")).unwrap();
        fs::create_dir_all(root.join("empty_run")).unwrap();
        fs::write(root.join("top.json"), b"{}").unwrap();
        fs::write(root.join("notes.txt"), b"ignored").unwrap();
        fs::write(root.join("run_a/step_01_initial_arc.json"), b"{}").unwrap();
        fs::write(root.join("run_a/step_02_final_export.json"), b"{}").unwrap();
        fs::write(root.join("run_b/nested/deep.json"), b"{}").unwrap();
        fs::write(root.join("empty_run/readme.md"), b"").unwrap();
        let store = SaveStore::new(root, ListingLimits::default());
        (dir, store)
    }

    fn paths(entries: &[SaveEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_recursive_listing_finds_every_json_file() {
        let (_dir, store) = fixture();
        let entries = store.list_entries(None).unwrap();
        assert_eq!(
            paths(&entries),
            vec![
                "run_a/step_01_initial_arc.json",
                "run_a/step_02_final_export.json",
                "run_b/nested/deep.json",
                "top.json",
            ]
        );
        assert_eq!(entries[2].name, "deep.json");
    }

    #[test]
    fn test_listing_reflects_changes_between_calls() {
        let (dir, store) = fixture();
        assert_eq!(store.list_entries(None).unwrap().len(), 4);

        fs::write(dir.path().join("run_a/step_03.json"), b"{}").unwrap();
        fs::remove_file(dir.path().join("top.json")).unwrap();

        let entries = store.list_entries(None).unwrap();
        assert!(paths(&entries).contains(&"run_a/step_03.json"));
        assert!(!paths(&entries).contains(&"top.json"));
    }

    #[test]
    fn test_folder_listing_is_flat() {
        let (_dir, store) = fixture();
        let entries = store.list_entries(Some("run_b")).unwrap();
        assert!(entries.is_empty());

        let entries = store.list_entries(Some("run_a")).unwrap();
        assert_eq!(
            paths(&entries),
            vec!["run_a/step_01_initial_arc.json", "run_a/step_02_final_export.json"]
        );
    }

    #[test]
    fn test_folder_listing_guards_path() {
        let (_dir, store) = fixture();
        assert!(matches!(
            store.list_entries(Some("../")),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.list_entries(Some("missing")),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_folders_only_with_json() {
        let (_dir, store) = fixture();
        let folders = store.list_folders().unwrap();
        assert_eq!(paths(&folders), vec!["run_a"]);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let store = SaveStore::new(dir.path().join("nope"), ListingLimits::default());
        assert!(matches!(store.list_entries(None), Err(StoreError::RootMissing { .. })));
        assert!(matches!(store.list_folders(), Err(StoreError::RootMissing { .. })));
        assert!(matches!(
            store.list_entries(Some("run_a")),
            Err(StoreError::RootMissing { .. })
        ));
    }

    #[test]
    fn test_limits_bound_the_walk() {
        let (dir, _) = fixture();
        let shallow = SaveStore::new(
            dir.path(),
            ListingLimits {
                max_depth: 2,
                max_files: 100,
            },
        );
        assert!(!paths(&shallow.list_entries(None).unwrap()).contains(&"run_b/nested/deep.json"));

        let capped = SaveStore::new(
            dir.path(),
            ListingLimits {
                max_depth: 16,
                max_files: 2,
            },
        );
        assert_eq!(capped.list_entries(None).unwrap().len(), 2);
    }

    #[test]
    fn test_latest_prefers_final_export() {
        let (_dir, store) = fixture();
        let latest = store.latest_entry("run_a").unwrap();
        assert_eq!(latest.path, "run_a/step_02_final_export.json");
    }

    #[test]
    fn test_latest_falls_back_to_newest_file() {
        let (dir, store) = fixture();
        let older = dir.path().join("run_b/nested/older.json");
        fs::write(&older, b"{}").unwrap();
        let past = SystemTime::now() - std::time::Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let latest = store.latest_entry("run_b/nested").unwrap();
        assert_eq!(latest.path, "run_b/nested/deep.json");
        assert!(matches!(
            store.latest_entry("empty_run"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
