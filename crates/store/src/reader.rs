use serde_json::Value;

use crate::{SaveStore, StoreError};

impl SaveStore {
    /// Read a save file's raw bytes.
    pub fn read_entry(&self, relative: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(relative)?;
        let bytes = std::fs::read(&path).map_err(|e| StoreError::from_io(&path, e))?;
        tracing::debug!(path = relative, bytes = bytes.len(), "Read save file");
        Ok(bytes)
    }

    /// Read a save file and parse it as JSON of any shape.
    pub fn read_document(&self, relative: &str) -> Result<Value, StoreError> {
        let bytes = self.read_entry(relative)?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: relative.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListingLimits;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_entry_returns_exact_bytes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("run")).unwrap();
        let content = b"{ \"situations\": [] }\n";
        fs::write(dir.path().join("run/save.json"), content).unwrap();

        let store = SaveStore::new(dir.path(), ListingLimits::default());
        assert_eq!(store.read_entry("run/save.json").unwrap(), content.to_vec());
        assert_eq!(store.read_entry("./run/../run/save.json").unwrap(), content.to_vec());
    }

    #[test]
    fn test_read_document_parses_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), br#"{"foo": 1}"#).unwrap();
        fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

        let store = SaveStore::new(dir.path(), ListingLimits::default());
        assert_eq!(store.read_document("a.json").unwrap()["foo"], 1);
        assert!(matches!(
            store.read_document("broken.json"),
            Err(StoreError::Parse { .. })
        ));
        assert!(matches!(
            store.read_document("../a.json"),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.read_document("missing.json"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
