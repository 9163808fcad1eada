//! Ledger persistence.
//!
//! Two backends are available:
//!   - **JSON file** (default): the full record sequence as a pretty-printed
//!     JSON array, rewritten atomically (temp file + rename) on every save.
//!   - **Memory**: keeps the last saved sequence in process (tests, embedding).
//!
//! Both implement `LedgerStore`. A save always receives the complete
//! sequence, so every append costs O(N) in the ledger length.

use fcl_core::{FclError, FclResult};
use std::path::{Path, PathBuf};

use crate::record::Record;

/// Durable home of a ledger's record sequence.
pub trait LedgerStore {
    /// Human-readable location for logs and errors.
    fn location(&self) -> String;

    /// Load the persisted sequence. `Ok(None)` means nothing has been
    /// persisted yet; anything present but unusable is `CorruptLedger`.
    fn load(&self) -> FclResult<Option<Vec<Record>>>;

    /// Replace the persisted sequence with `records`.
    fn save(&mut self, records: &[Record]) -> FclResult<()>;
}

/// Encode records in the on-disk format (JSON array, 2-space indent).
pub fn to_json(records: &[Record]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Decode records from the on-disk format, preserving every field as stored.
pub fn from_json(content: &str) -> serde_json::Result<Vec<Record>> {
    serde_json::from_str(content)
}

/// Ledger persisted to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> FclResult<Option<Vec<Record>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FclError::corrupt(self.location(), format!("unreadable: {e}"))),
        };
        from_json(&content)
            .map(Some)
            .map_err(|e| FclError::corrupt(self.location(), format!("invalid JSON: {e}")))
    }

    fn save(&mut self, records: &[Record]) -> FclResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| FclError::persistence(parent.display().to_string(), e))?;
            }
        }

        let json = to_json(records)
            .map_err(|e| FclError::persistence(self.location(), std::io::Error::other(e)))?;

        // Atomic write: write to temp file, then rename
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|e| FclError::persistence(tmp_path.display().to_string(), e))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| FclError::persistence(self.location(), e))?;

        tracing::trace!(path = %self.path.display(), records = records.len(), "ledger saved");
        Ok(())
    }
}

/// In-process store. Starts empty unless seeded.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Option<Vec<Record>>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store as if `records` had already been persisted.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Some(records),
            saves: 0,
        }
    }

    /// Last saved sequence, if any.
    pub fn records(&self) -> Option<&[Record]> {
        self.records.as_deref()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl LedgerStore for MemoryStore {
    fn location(&self) -> String {
        "memory".into()
    }

    fn load(&self) -> FclResult<Option<Vec<Record>>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[Record]) -> FclResult<()> {
        self.records = Some(records.to_vec());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcl_core::IdentityScheme;

    fn sample() -> Vec<Record> {
        let genesis = Record::genesis(IdentityScheme::Concat, 1700000000000);
        let next = Record::create(1, 1700000012345, "a3f5e91", genesis.identity());
        vec![genesis, next]
    }

    #[test]
    fn open_nonexistent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("ledger.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested/dir/ledger.json"));
        let records = sample();

        store.save(&records).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), records);
        assert!(!dir.path().join("nested/dir/ledger.json.tmp").exists());
    }

    #[test]
    fn on_disk_format_is_pretty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut store = JsonFileStore::new(&path);
        store.save(&sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {\n    \"index\": 0,"));
        assert!(content.contains("\"fileHash\": \"Genesis Block\""));
        assert!(content.contains("\"previousHash\": \"0\""));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, FclError::CorruptLedger { .. }));
    }

    #[test]
    fn directory_in_place_of_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::create_dir(&path).unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, FclError::CorruptLedger { .. }));
    }

    #[test]
    fn foreign_file_decodes_verbatim() {
        let content = r#"[
  {
    "index": 0,
    "timestamp": 1700000000000,
    "fileHash": "Genesis Block",
    "previousHash": "0",
    "nonce": 0,
    "hash": "not-a-real-digest"
  }
]"#;
        let records = from_json(content).unwrap();
        assert_eq!(records[0].identity(), "not-a-real-digest");
        assert_eq!(records[0].timestamp(), 1700000000000);
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.saves(), 2);
        assert_eq!(store.records().unwrap().len(), 2);
    }
}
