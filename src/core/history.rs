//! # Local History
//!
//! Durable copy of the active transcript under the `chatHistory` key.
//!
//! The value is a JSON array of `{question, answer}` pairs. It is read once at
//! startup, overwritten in full after every transcript mutation, and removed
//! on "new chat". There is no merging: the last write wins.
//!
//! `FileHistoryStore` keeps the value in `<state_dir>/chatHistory.json` and
//! writes atomically (write `.tmp`, then `rename()`).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};

/// Storage key for the persisted transcript.
pub const HISTORY_KEY: &str = "chatHistory";

/// One persisted exchange.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub question: String,
    pub answer: String,
}

#[derive(Debug)]
pub enum HistoryError {
    Io(io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Io(e) => write!(f, "history I/O error: {e}"),
            HistoryError::Format(e) => write!(f, "history format error: {e}"),
        }
    }
}

impl std::error::Error for HistoryError {}

impl From<io::Error> for HistoryError {
    fn from(e: io::Error) -> Self {
        HistoryError::Io(e)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        HistoryError::Format(e)
    }
}

/// Key/value slot holding the serialized transcript.
pub trait HistoryStore: Send {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>, HistoryError>;

    /// Overwrites the stored value.
    fn save(&mut self, records: &[HistoryRecord]) -> Result<(), HistoryError>;

    /// Removes the stored value entirely.
    fn clear(&mut self) -> Result<(), HistoryError>;
}

// ============================================================================
// File-backed store
// ============================================================================

pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    /// Stores into `<dir>/chatHistory.json`, creating `dir` if needed.
    pub fn new(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{HISTORY_KEY}.json")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), HistoryError> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string(data)?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>, HistoryError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let records = serde_json::from_str(&json)?;
        Ok(Some(records))
    }

    fn save(&mut self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        atomic_write_json(&self.path, records)?;
        debug!("History saved: {} entries", records.len());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default, Debug)]
struct MemorySlot {
    value: Option<String>,
    writes: Vec<Option<String>>,
}

/// Keeps the serialized value in memory. Clones share the same slot, so a test
/// can hand one clone to the session and inspect the other.
#[derive(Clone, Default, Debug)]
pub struct MemoryHistoryStore {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the slot as if a previous run had saved `records`.
    pub fn with_records(records: &[HistoryRecord]) -> Self {
        let store = Self::new();
        let json = serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string());
        store.lock().value = Some(json);
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The raw stored JSON, if any.
    pub fn raw(&self) -> Option<String> {
        self.lock().value.clone()
    }

    /// Every write in order; `None` marks a clear.
    pub fn writes(&self) -> Vec<Option<String>> {
        self.lock().writes.clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Option<Vec<HistoryRecord>>, HistoryError> {
        match self.raw() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        let json = serde_json::to_string(records)?;
        let mut slot = self.lock();
        slot.value = Some(json.clone());
        slot.writes.push(Some(json));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        let mut slot = self.lock();
        slot.value = None;
        slot.writes.push(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(q: &str, a: &str) -> HistoryRecord {
        HistoryRecord {
            question: q.to_string(),
            answer: a.to_string(),
        }
    }

    #[test]
    fn test_file_store_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileHistoryStore::new(dir.path()).unwrap();
        let records = vec![record("Hello", "Hi there"), record("Q", "A")];
        store.save(&records).unwrap();

        let reopened = FileHistoryStore::new(dir.path()).unwrap();
        assert_eq!(reopened.load().unwrap(), Some(records));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_uses_history_key_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        assert_eq!(store.path().file_name().unwrap(), "chatHistory.json");
    }

    #[test]
    fn test_file_store_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileHistoryStore::new(dir.path()).unwrap();
        store.save(&[record("one", "1"), record("two", "2")]).unwrap();
        store.save(&[record("three", "3")]).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![record("three", "3")]));
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileHistoryStore::new(dir.path()).unwrap();
        store.save(&[record("q", "a")]).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileHistoryStore::new(dir.path()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(HistoryError::Format(_))));
    }

    #[test]
    fn test_memory_store_shares_slot_between_clones() {
        let observer = MemoryHistoryStore::new();
        let mut writer = observer.clone();
        writer.save(&[record("q", "a")]).unwrap();
        assert_eq!(observer.raw().as_deref(), Some(r#"[{"question":"q","answer":"a"}]"#));
        writer.clear().unwrap();
        assert!(observer.raw().is_none());
        assert_eq!(observer.writes().len(), 2);
    }

    #[test]
    fn test_memory_store_with_records_loads() {
        let store = MemoryHistoryStore::with_records(&[record("Q", "A")]);
        assert_eq!(store.load().unwrap(), Some(vec![record("Q", "A")]));
        assert!(store.writes().is_empty());
    }
}
