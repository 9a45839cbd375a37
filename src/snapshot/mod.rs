//! Snapshot persistence for the benchmark history
//!
//! The whole `HistoryStore` is persisted as one aggregate document:
//!
//! ```text
//! {
//!   "lastUpdate": 1700000000000,
//!   "repoUrl": "https://github.com/acme/widgets",
//!   "entries": {
//!     "<suite>": [ { "commit": {...}, "date": ..., "tool": "...", "benches": [...] } ]
//!   }
//! }
//! ```
//!
//! The document can be written as plain JSON or as the `data.js` script the
//! benchmark dashboard page includes (`window.BENCHMARK_DATA = {...}`).
//!
//! # Example
//!
//! ```rust
//! use bench_ledger::history::{HistoryStore, Measurement, RunRecord};
//! use bench_ledger::snapshot::{MemorySnapshotStore, SnapshotStore};
//!
//! let backend = MemorySnapshotStore::new();
//!
//! let mut store = backend.load()?;
//! store.append("widgets", RunRecord::new("c1", "cargo", vec![Measurement::new("a", 1.0, 0.0, "ns")]))?;
//! backend.store(&store)?;
//!
//! assert_eq!(backend.load()?.read("widgets").map(|s| s.len()), Some(1));
//! # Ok::<(), bench_ledger::Error>(())
//! ```

mod file;
mod memory;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::history::{AppendResult, HistoryStore, RunRecord};
use crate::{Error, Result};

/// Assignment prefix of the dashboard's `data.js` script.
pub const JS_ASSIGNMENT_PREFIX: &str = "window.BENCHMARK_DATA = ";

/// Load/store boundary between the history store and its persisted form.
///
/// Both operations are atomic from the caller's point of view: `load`
/// returns a fully rebuilt store or an error, and `store` replaces the
/// previous snapshot entirely or not at all. Serializing concurrent
/// load → append → store cycles is the caller's job.
pub trait SnapshotStore {
    /// Load the persisted history. A missing snapshot loads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or is malformed.
    fn load(&self) -> Result<HistoryStore>;

    /// Persist the history, replacing the previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn store(&self, history: &HistoryStore) -> Result<()>;
}

/// Text encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    /// Plain pretty-printed JSON.
    #[default]
    Json,
    /// `window.BENCHMARK_DATA = {...}` script for the dashboard page.
    JsAssignment,
}

/// Wire shape of the persisted aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkData {
    /// Epoch milliseconds of the most recent append (0 if never)
    #[serde(default)]
    pub last_update: i64,
    /// Repository URL
    #[serde(default)]
    pub repo_url: String,
    /// Runs per suite, in append order
    #[serde(default)]
    pub entries: BTreeMap<String, Vec<RunRecord>>,
}

impl BenchmarkData {
    /// Capture a snapshot of a history store.
    #[must_use]
    pub fn from_store(history: &HistoryStore) -> Self {
        Self {
            last_update: history
                .last_update()
                .map_or(0, |ts| ts.timestamp_millis()),
            repo_url: history.repo_url().to_string(),
            entries: history
                .suites()
                .map(|series| (series.suite_name().to_string(), series.records().to_vec()))
                .collect(),
        }
    }

    /// Rebuild a history store by replaying every run with `append`'s checks.
    ///
    /// Duplicate commits inside a suite are dropped (first occurrence wins).
    /// `last_update` comes from the snapshot only.
    ///
    /// # Errors
    ///
    /// Returns `Error::Snapshot` naming the suite and commit of the first
    /// run that fails validation or unit checks.
    pub fn into_store(self) -> Result<HistoryStore> {
        let mut history = HistoryStore::with_repo_url(self.repo_url);

        for (suite, records) in self.entries {
            for record in records {
                let commit = record.commit_id().to_string();
                match history.restore(&suite, record) {
                    Ok(AppendResult::Appended) => {}
                    Ok(AppendResult::Duplicate) => {
                        warn!(suite = %suite, commit = %commit, "dropping duplicate run from snapshot");
                    }
                    Err(e) => {
                        return Err(Error::Snapshot(format!(
                            "suite '{suite}', commit '{commit}': {e}"
                        )));
                    }
                }
            }
        }

        let last_update = if self.last_update > 0 {
            DateTime::<Utc>::from_timestamp_millis(self.last_update)
        } else {
            None
        };
        history.set_last_update(last_update);
        Ok(history)
    }
}

/// Encode a history store in the given format.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn encode(history: &HistoryStore, format: SnapshotFormat) -> Result<String> {
    let json = serde_json::to_string_pretty(&BenchmarkData::from_store(history))?;
    Ok(match format {
        SnapshotFormat::Json => json,
        SnapshotFormat::JsAssignment => format!("{JS_ASSIGNMENT_PREFIX}{json}\n"),
    })
}

/// Decode a snapshot written in either format.
///
/// Blank input decodes to an empty store.
///
/// # Errors
///
/// Returns `Error::Json` for malformed JSON and `Error::Snapshot` for runs
/// that violate the history invariants.
pub fn decode(text: &str) -> Result<HistoryStore> {
    let body = strip_js_assignment(text);
    if body.is_empty() {
        return Ok(HistoryStore::new());
    }
    let data: BenchmarkData = serde_json::from_str(body)?;
    data.into_store()
}

fn strip_js_assignment(text: &str) -> &str {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix(JS_ASSIGNMENT_PREFIX.trim_end())
        .unwrap_or(trimmed)
        .trim();
    body.strip_suffix(';').unwrap_or(body).trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Measurement;

    fn sample_store() -> HistoryStore {
        let mut store = HistoryStore::with_repo_url("https://example.com/repo");
        store
            .append("s", RunRecord::new("c1", "cargo", vec![Measurement::new("a", 1.0, 0.5, "ns")]))
            .unwrap();
        store
    }

    #[test]
    fn test_strip_js_assignment() {
        assert_eq!(strip_js_assignment("window.BENCHMARK_DATA = {}"), "{}");
        assert_eq!(strip_js_assignment("window.BENCHMARK_DATA = {};\n"), "{}");
        assert_eq!(strip_js_assignment("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_js_assignment(""), "");
    }

    #[test]
    fn test_encode_js_assignment_prefix() {
        let text = encode(&sample_store(), SnapshotFormat::JsAssignment).unwrap();
        assert!(text.starts_with(JS_ASSIGNMENT_PREFIX));
        assert!(text.contains("\"repoUrl\": \"https://example.com/repo\""));
    }

    #[test]
    fn test_decode_blank_is_empty() {
        assert!(decode("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_last_update_zero_means_never() {
        let data = BenchmarkData::default();
        assert!(data.into_store().unwrap().last_update().is_none());
    }

    #[test]
    fn test_last_update_zero_with_entries_stays_never() {
        let mut data = BenchmarkData::default();
        data.entries.insert(
            "s".to_string(),
            vec![RunRecord::new("c1", "cargo", vec![Measurement::new("a", 1.0, 0.0, "ns")])],
        );

        let store = data.into_store().unwrap();

        assert_eq!(store.read("s").unwrap().len(), 1);
        assert!(store.last_update().is_none());
    }

    #[test]
    fn test_last_update_taken_from_snapshot() {
        let data = BenchmarkData {
            last_update: 1_700_000_000_123,
            ..BenchmarkData::from_store(&sample_store())
        };

        let store = data.into_store().unwrap();

        assert_eq!(store.last_update().map(|t| t.timestamp_millis()), Some(1_700_000_000_123));
    }

    #[test]
    fn test_into_store_reports_unit_conflict() {
        let mut data = BenchmarkData::default();
        data.entries.insert(
            "s".to_string(),
            vec![
                RunRecord::new("c1", "cargo", vec![Measurement::new("a", 1.0, 0.0, "ns")]),
                RunRecord::new("c2", "cargo", vec![Measurement::new("a", 1.0, 0.0, "ms")]),
            ],
        );

        let err = data.into_store().unwrap_err();
        assert!(matches!(err, Error::Snapshot(ref msg) if msg.contains("c2")));
    }
}
