//! History Store - owner of every suite's run history
//!
//! This module provides the single mutation point of the ledger. Reads are
//! free and shared; writes go through `append` only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;

use super::{AppendResult, RunRecord, SuiteSeries};
use crate::{Error, Result};

/// In-memory benchmark history, keyed by suite name.
///
/// ## Design
///
/// Suites are kept in a `BTreeMap` so that enumeration and the persisted
/// snapshot have a stable order. Each `SuiteSeries` indexes its runs by
/// commit id, which makes duplicate detection O(1).
///
/// ## Idempotence
///
/// Appending a run whose commit id is already recorded is a no-op that
/// returns `AppendResult::Duplicate`. A CI job that retries its
/// load → append → store cycle therefore converges to the same history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStore {
    suites: BTreeMap<String, SuiteSeries>,
    repo_url: String,
    last_update: Option<DateTime<Utc>>,
}

impl HistoryStore {
    /// Create a new empty history store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store for the given repository URL.
    #[must_use]
    pub fn with_repo_url(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            ..Self::default()
        }
    }

    /// Check if the store has no suites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Get the number of suites in the store.
    #[must_use]
    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    /// Get the repository URL the history belongs to.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Get the instant of the most recent successful append.
    #[must_use]
    pub const fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Append a run to a suite.
    ///
    /// Creates the suite on its first accepted run. Measurements are not
    /// compared against history here; run the detector after a successful
    /// append for that.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use bench_ledger::history::{AppendResult, HistoryStore, Measurement, RunRecord};
    ///
    /// let mut store = HistoryStore::new();
    /// let run = RunRecord::new("c1", "cargo", vec![Measurement::new("parse", 100.0, 5.0, "ns/iter")]);
    ///
    /// assert_eq!(store.append("parser", run.clone())?, AppendResult::Appended);
    /// assert_eq!(store.append("parser", run)?, AppendResult::Duplicate);
    /// assert_eq!(store.read("parser").map(|s| s.len()), Some(1));
    /// # Ok::<(), bench_ledger::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a blank suite name or malformed run,
    /// and `Error::UnitMismatch` when a measurement changes unit. In both
    /// cases the store is unchanged.
    pub fn append(&mut self, suite_name: &str, record: RunRecord) -> Result<AppendResult> {
        let commit = record.commit_id().to_string();
        let benches = record.benches().len();

        let result = self.insert(suite_name, record)?;

        if result == AppendResult::Appended {
            self.last_update = Some(Utc::now());
            info!(suite = suite_name, commit = %commit, benches, "run appended");
        }
        Ok(result)
    }

    /// Replay a previously persisted run.
    ///
    /// Same checks as `append`, but neither `last_update` nor the append log
    /// is touched: loading a snapshot is not a new run.
    pub(crate) fn restore(&mut self, suite_name: &str, record: RunRecord) -> Result<AppendResult> {
        self.insert(suite_name, record)
    }

    fn insert(&mut self, suite_name: &str, record: RunRecord) -> Result<AppendResult> {
        if suite_name.trim().is_empty() {
            return Err(Error::Validation("suite name is empty".to_string()));
        }

        match self.suites.get_mut(suite_name) {
            Some(series) => series.try_append(record),
            None => {
                // Only materialize the suite once its first run is accepted
                let mut series = SuiteSeries::new(suite_name);
                let result = series.try_append(record)?;
                self.suites.insert(suite_name.to_string(), series);
                Ok(result)
            }
        }
    }

    /// Read a suite's history.
    ///
    /// Returns `None` for a suite that has never been appended to, which is
    /// the normal state on a project's first run.
    #[must_use]
    pub fn read(&self, suite_name: &str) -> Option<&SuiteSeries> {
        self.suites.get(suite_name)
    }

    /// Read a suite's history, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::SuiteNotFound` if the suite does not exist.
    pub fn require(&self, suite_name: &str) -> Result<&SuiteSeries> {
        self.read(suite_name)
            .ok_or_else(|| Error::SuiteNotFound(suite_name.to_string()))
    }

    /// Enumerate known suite names in sorted order.
    ///
    /// Every call starts a fresh enumeration.
    pub fn suite_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.suites.keys().map(String::as_str)
    }

    /// Enumerate every suite's history in name order.
    pub fn suites(&self) -> impl Iterator<Item = &SuiteSeries> + '_ {
        self.suites.values()
    }

    pub(crate) fn set_last_update(&mut self, last_update: Option<DateTime<Utc>>) {
        self.last_update = last_update;
    }
}
