//! Regression Detector
//!
//! Compares one run of a suite against a baseline built from the runs
//! appended before it.
//!
//! ## Algorithm
//!
//! ```text
//! runs:      r0  r1  r2  r3  r4  [r5]      target = r5, window = Last(3)
//! baseline:              ^^^^^^^^          r2..=r4
//! ```
//!
//! For every measurement of the target that also appears in the baseline:
//!
//! 1. Summarize the baseline values (`BaselineStatistic`).
//! 2. `ratio = current / baseline` (baseline exactly zero → anomaly, neutral).
//! 3. If `|current - baseline| < max(current range, baseline range)` the
//!    change is noise → neutral.
//! 4. Smaller-is-better: `ratio >= threshold` regresses, `ratio <= 1/threshold`
//!    improves. Bigger-is-better mirrors this.
//!
//! ## Example
//!
//! ```rust
//! use bench_ledger::detect::{detect, DetectorConfig, Verdict, Window};
//! use bench_ledger::history::{HistoryStore, Measurement, RunRecord};
//!
//! let mut store = HistoryStore::new();
//! store.append("s", RunRecord::new("c1", "cargo", vec![Measurement::new("building", 100.0, 5.0, "ns")]))?;
//! store.append("s", RunRecord::new("c2", "cargo", vec![Measurement::new("building", 260.0, 5.0, "ns")]))?;
//!
//! let config = DetectorConfig::builder().window(Window::Last(1)).alert_threshold(2.0).build()?;
//! let report = detect(store.require("s")?, "c2", &config)?;
//!
//! assert_eq!(report.verdict_for("building").map(|v| v.verdict), Some(Verdict::Regression));
//! # Ok::<(), bench_ledger::Error>(())
//! ```

mod config;
mod stats;
mod verdict;

pub use config::{
    BaselineStatistic, DetectorConfig, DetectorConfigBuilder, Direction, Window,
    DEFAULT_ALERT_THRESHOLD,
};
pub use verdict::{Anomaly, DetectionReport, RegressionVerdict, Verdict};

use tracing::{debug, instrument, warn};

use crate::history::{Measurement, RunRecord, SuiteSeries};
use crate::{Error, Result};

/// Compare the run for `target_commit_id` against its baseline window.
///
/// Produces exactly one verdict per measurement present in both the target
/// and at least one baseline run. The first run of a suite has no baseline
/// and yields an empty report.
///
/// # Errors
///
/// Returns `Error::CommitNotFound` if the commit is not in the series and
/// `Error::InvalidConfig` if the configuration does not validate.
#[instrument(skip_all, fields(suite = series.suite_name(), commit = target_commit_id))]
pub fn detect(
    series: &SuiteSeries,
    target_commit_id: &str,
    config: &DetectorConfig,
) -> Result<DetectionReport> {
    config.validate()?;

    let position = series
        .position(target_commit_id)
        .ok_or_else(|| Error::CommitNotFound {
            suite: series.suite_name().to_string(),
            commit: target_commit_id.to_string(),
        })?;

    let records = series.records();
    let start = match config.window() {
        Window::All => 0,
        Window::Last(k) => position.saturating_sub(k),
    };
    let baseline = &records[start..position];
    let target = &records[position];

    let mut report = DetectionReport {
        suite_name: series.suite_name().to_string(),
        commit_id: target_commit_id.to_string(),
        baseline_runs: baseline.len(),
        alert_threshold: config.alert_threshold(),
        fail_threshold: config.fail_threshold(),
        verdicts: Vec::new(),
        anomalies: Vec::new(),
    };

    for current in target.benches() {
        let samples: Vec<&Measurement> = baseline
            .iter()
            .filter_map(|run| run.bench(current.name()))
            .collect();
        if samples.is_empty() {
            debug!(measurement = current.name(), "no baseline, skipping");
            continue;
        }
        compare(current, &samples, config, &mut report);
    }

    debug!(
        verdicts = report.verdicts.len(),
        regressions = report.regressions().count(),
        "detection complete"
    );
    Ok(report)
}

/// Run `detect` for the most recently appended run of a series.
///
/// Returns `Ok(None)` for an empty series.
///
/// # Errors
///
/// Returns `Error::InvalidConfig` if the configuration does not validate.
pub fn detect_latest(series: &SuiteSeries, config: &DetectorConfig) -> Result<Option<DetectionReport>> {
    series
        .latest()
        .map(RunRecord::commit_id)
        .map(|commit| detect(series, commit, config))
        .transpose()
}

#[allow(clippy::float_cmp)]
fn compare(
    current: &Measurement,
    samples: &[&Measurement],
    config: &DetectorConfig,
    report: &mut DetectionReport,
) {
    let direction = config.direction_for(current.name());
    let values: Vec<f64> = samples.iter().map(|m| m.value()).collect();
    let ranges: Vec<f64> = samples.iter().map(|m| m.range()).collect();

    let baseline_value = baseline_statistic(&values, config.statistic(), direction);
    let baseline_range = stats::mean(&ranges).unwrap_or(0.0);

    let mut verdict = RegressionVerdict {
        measurement_name: current.name().to_string(),
        unit: current.unit().to_string(),
        baseline_value,
        current_value: current.value(),
        delta_ratio: None,
        baseline_samples: samples.len(),
        verdict: Verdict::Neutral,
    };

    if baseline_value == 0.0 {
        warn!(measurement = current.name(), "baseline is zero, no ratio");
        report.anomalies.push(Anomaly::ZeroBaseline {
            measurement_name: current.name().to_string(),
            current_value: current.value(),
        });
        report.verdicts.push(verdict);
        return;
    }

    let ratio = current.value() / baseline_value;
    verdict.delta_ratio = Some(ratio);

    let within_noise = config.noise_gate()
        && (current.value() - baseline_value).abs() < current.range().max(baseline_range);
    if !within_noise {
        verdict.verdict = classify(ratio, config.alert_threshold(), direction);
    }

    report.verdicts.push(verdict);
}

fn baseline_statistic(values: &[f64], statistic: BaselineStatistic, direction: Direction) -> f64 {
    let mean = stats::mean(values).unwrap_or(0.0);
    match statistic {
        BaselineStatistic::Mean => mean,
        BaselineStatistic::Last => values.last().copied().unwrap_or(0.0),
        BaselineStatistic::MeanStdDev { multiple } => {
            let spread = multiple * stats::sample_std_dev(values);
            match direction {
                Direction::SmallerIsBetter => mean + spread,
                // A non-positive shifted baseline has no meaningful ratio
                Direction::BiggerIsBetter if mean - spread > 0.0 => mean - spread,
                Direction::BiggerIsBetter => mean,
            }
        }
    }
}

fn classify(ratio: f64, threshold: f64, direction: Direction) -> Verdict {
    let (worse, better) = match direction {
        Direction::SmallerIsBetter => (ratio >= threshold, ratio <= threshold.recip()),
        Direction::BiggerIsBetter => (ratio <= threshold.recip(), ratio >= threshold),
    };
    if worse {
        Verdict::Regression
    } else if better {
        Verdict::Improvement
    } else {
        Verdict::Neutral
    }
}
