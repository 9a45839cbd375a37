//! Suite Series - append-only run history of one benchmark suite

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::RunRecord;
use crate::{Error, Result};

/// Outcome of appending a run to a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendResult {
    /// The run was added at the end of the series.
    Appended,
    /// A run for the same commit already exists; nothing changed.
    Duplicate,
}

/// Ordered, append-only sequence of runs for one suite.
///
/// ## Invariants
///
/// - No two runs share a commit id (first write wins).
/// - Append order is authoritative; runs are never re-sorted by date.
/// - Each measurement name keeps the unit it was first recorded with.
///
/// Only `HistoryStore` can grow a series; everyone else gets `&SuiteSeries`.
#[derive(Debug, Clone)]
pub struct SuiteSeries {
    suite_name: String,
    records: Vec<RunRecord>,
    positions: FxHashMap<String, usize>,
    units: FxHashMap<String, String>,
}

impl PartialEq for SuiteSeries {
    fn eq(&self, other: &Self) -> bool {
        // Indexes are derived from `records`
        self.suite_name == other.suite_name && self.records == other.records
    }
}

impl SuiteSeries {
    pub(crate) fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            records: Vec::new(),
            positions: FxHashMap::default(),
            units: FxHashMap::default(),
        }
    }

    /// Get the suite name.
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Get the runs in append order.
    #[must_use]
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Number of runs in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the series has no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a commit's run in append order.
    #[must_use]
    pub fn position(&self, commit_id: &str) -> Option<usize> {
        self.positions.get(commit_id).copied()
    }

    /// Check if a run for the commit exists.
    #[must_use]
    pub fn contains(&self, commit_id: &str) -> bool {
        self.positions.contains_key(commit_id)
    }

    /// Get the run recorded for a commit.
    #[must_use]
    pub fn get(&self, commit_id: &str) -> Option<&RunRecord> {
        self.position(commit_id).map(|i| &self.records[i])
    }

    /// Get the most recently appended run.
    #[must_use]
    pub fn latest(&self) -> Option<&RunRecord> {
        self.records.last()
    }

    /// Unit a measurement name is bound to in this suite.
    #[must_use]
    pub fn unit_of(&self, measurement: &str) -> Option<&str> {
        self.units.get(measurement).map(String::as_str)
    }

    /// Append a run, enforcing commit uniqueness and unit consistency.
    ///
    /// The record is checked in full before anything is mutated, so a
    /// rejected record leaves the series exactly as it was.
    pub(crate) fn try_append(&mut self, record: RunRecord) -> Result<AppendResult> {
        record.validate()?;

        if self.contains(record.commit_id()) {
            debug!(
                suite = %self.suite_name,
                commit = record.commit_id(),
                "duplicate run absorbed"
            );
            return Ok(AppendResult::Duplicate);
        }

        self.check_units(&record)?;

        if let Some(last) = self.records.last() {
            if record.date() < last.date() {
                warn!(
                    suite = %self.suite_name,
                    commit = record.commit_id(),
                    previous = last.commit_id(),
                    "run is dated before the previous run; keeping append order"
                );
            }
        }

        for bench in record.benches() {
            self.units
                .entry(bench.name().to_string())
                .or_insert_with(|| bench.unit().to_string());
        }
        self.positions
            .insert(record.commit_id().to_string(), self.records.len());
        self.records.push(record);

        Ok(AppendResult::Appended)
    }

    fn check_units(&self, record: &RunRecord) -> Result<()> {
        for bench in record.benches() {
            if let Some(expected) = self.units.get(bench.name()) {
                if expected != bench.unit() {
                    warn!(
                        suite = %self.suite_name,
                        commit = record.commit_id(),
                        measurement = bench.name(),
                        expected = %expected,
                        found = bench.unit(),
                        "unit mismatch, rejecting run"
                    );
                    return Err(Error::UnitMismatch {
                        suite: self.suite_name.clone(),
                        measurement: bench.name().to_string(),
                        expected: expected.clone(),
                        found: bench.unit().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Measurement;

    fn run(commit: &str, name: &str, value: f64, unit: &str) -> RunRecord {
        RunRecord::new(commit, "cargo", vec![Measurement::new(name, value, 1.0, unit)])
    }

    #[test]
    fn test_series_append_and_lookup() {
        let mut series = SuiteSeries::new("suite");
        assert!(series.is_empty());

        assert_eq!(series.try_append(run("c1", "a", 1.0, "ns")).unwrap(), AppendResult::Appended);
        assert_eq!(series.try_append(run("c2", "a", 2.0, "ns")).unwrap(), AppendResult::Appended);

        assert_eq!(series.len(), 2);
        assert_eq!(series.position("c2"), Some(1));
        assert_eq!(series.latest().unwrap().commit_id(), "c2");
        assert_eq!(series.unit_of("a"), Some("ns"));
        assert!(series.get("c3").is_none());
    }

    #[test]
    fn test_series_duplicate_keeps_first() {
        let mut series = SuiteSeries::new("suite");
        series.try_append(run("c1", "a", 1.0, "ns")).unwrap();

        let result = series.try_append(run("c1", "a", 99.0, "ns")).unwrap();

        assert_eq!(result, AppendResult::Duplicate);
        assert_eq!(series.len(), 1);
        assert!((series.get("c1").unwrap().benches()[0].value() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_series_unit_mismatch_rejects_whole_record() {
        let mut series = SuiteSeries::new("suite");
        series.try_append(run("c1", "a", 1.0, "ns")).unwrap();

        let mixed = RunRecord::new(
            "c2",
            "cargo",
            vec![
                Measurement::new("b", 1.0, 0.0, "ms"),
                Measurement::new("a", 1.0, 0.0, "ms"),
            ],
        );
        let err = series.try_append(mixed).unwrap_err();

        assert!(matches!(err, Error::UnitMismatch { ref measurement, .. } if measurement == "a"));
        assert_eq!(series.len(), 1);
        assert!(series.unit_of("b").is_none());
    }

    #[test]
    fn test_series_keeps_out_of_order_dates() {
        use chrono::{TimeZone, Utc};
        let later = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let mut series = SuiteSeries::new("suite");
        for (commit, date) in [("c1", later), ("c2", earlier)] {
            let record = RunRecord::builder(commit, "cargo")
                .date(date)
                .bench(Measurement::new("a", 1.0, 0.0, "ns"))
                .build();
            series.try_append(record).unwrap();
        }

        let commits: Vec<&str> = series.records().iter().map(RunRecord::commit_id).collect();
        assert_eq!(commits, vec!["c1", "c2"]);
    }
}
