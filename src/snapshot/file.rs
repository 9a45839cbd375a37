//! File snapshot backend.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{decode, encode, SnapshotFormat, SnapshotStore};
use crate::history::HistoryStore;
use crate::{Error, Result};

/// Snapshot backend persisting the history to a single file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the
/// target, so readers only ever see a complete snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
    format: SnapshotFormat,
}

impl FileSnapshotStore {
    /// Create a backend for `path`, inferring the format from the
    /// extension (`.js` → `JsAssignment`, anything else → `Json`).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("js") => SnapshotFormat::JsAssignment,
            _ => SnapshotFormat::Json,
        };
        Self { path, format }
    }

    /// Create a backend for `path` with an explicit format.
    #[must_use]
    pub fn with_format(path: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Get the snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the snapshot format used for writing.
    #[must_use]
    pub const fn format(&self) -> SnapshotFormat {
        self.format
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<HistoryStore> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                return Ok(HistoryStore::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let history = decode(&text).map_err(|e| match e {
            Error::Json(json) => Error::Snapshot(format!(
                "failed to parse {}: {json}",
                self.path.display()
            )),
            other => other,
        })?;
        debug!(
            path = %self.path.display(),
            suites = history.suite_count(),
            "snapshot loaded"
        );
        Ok(history)
    }

    fn store(&self, history: &HistoryStore) -> Result<()> {
        let text = encode(history, self.format)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let written = write_synced(&temp, text.as_bytes()).and_then(|()| fs::rename(&temp, &self.path));
        if let Err(e) = written {
            // Leave no partial snapshot behind; the original error is what matters
            let _ = fs::remove_file(&temp);
            return Err(Error::Io(e));
        }

        debug!(
            path = %self.path.display(),
            bytes = text.len(),
            "snapshot stored"
        );
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
