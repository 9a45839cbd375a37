//! In-memory snapshot backend.
//!
//! Keeps the encoded snapshot text in process memory. Useful for tests and
//! dry runs; data is lost on process restart.

use std::sync::Mutex;

use super::{decode, encode, SnapshotFormat, SnapshotStore};
use crate::history::HistoryStore;
use crate::{Error, Result};

/// Snapshot backend holding the encoded document in memory.
///
/// Goes through the same encode/decode path as `FileSnapshotStore`, so a
/// history that survives a round trip here survives one on disk.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    text: Mutex<Option<String>>,
    format: SnapshotFormat,
}

impl MemorySnapshotStore {
    /// Create an empty in-memory backend using plain JSON.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty in-memory backend using the given format.
    #[must_use]
    pub fn with_format(format: SnapshotFormat) -> Self {
        Self {
            text: Mutex::new(None),
            format,
        }
    }

    /// Create a backend pre-seeded with snapshot text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
            format: SnapshotFormat::Json,
        }
    }

    /// Get the last stored snapshot text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Snapshot` if the internal lock is poisoned.
    pub fn text(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.text
            .lock()
            .map_err(|_| Error::Snapshot("memory snapshot lock poisoned".to_string()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<HistoryStore> {
        match self.lock()?.as_deref() {
            Some(text) => decode(text),
            None => Ok(HistoryStore::new()),
        }
    }

    fn store(&self, history: &HistoryStore) -> Result<()> {
        let text = encode(history, self.format)?;
        *self.lock()? = Some(text);
        Ok(())
    }
}
