//! Detection results

use std::fmt;

use serde::Serialize;

/// Classification of one measurement against its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Crossed the alert threshold in the worse direction.
    Regression,
    /// Crossed the alert threshold in the better direction.
    Improvement,
    /// Within threshold, within noise, or not comparable.
    Neutral,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Regression => "regression",
            Self::Improvement => "improvement",
            Self::Neutral => "neutral",
        })
    }
}

/// Comparison of one measurement of the target run against the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionVerdict {
    /// Measurement name
    pub measurement_name: String,
    /// Measurement unit
    pub unit: String,
    /// Baseline statistic
    pub baseline_value: f64,
    /// Value in the target run
    pub current_value: f64,
    /// `current / baseline`; `None` when the baseline is zero
    pub delta_ratio: Option<f64>,
    /// Number of baseline runs that carried this measurement
    pub baseline_samples: usize,
    /// Classification
    pub verdict: Verdict,
}

/// Something the detector could not classify and reports on the side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Baseline statistic is zero, so no ratio exists.
    ZeroBaseline {
        /// Measurement name
        measurement_name: String,
        /// Value in the target run
        current_value: f64,
    },
}

/// Result of running the detector for one target run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub(crate) suite_name: String,
    pub(crate) commit_id: String,
    pub(crate) baseline_runs: usize,
    pub(crate) alert_threshold: f64,
    pub(crate) fail_threshold: Option<f64>,
    pub(crate) verdicts: Vec<RegressionVerdict>,
    pub(crate) anomalies: Vec<Anomaly>,
}

impl DetectionReport {
    /// Suite the target run belongs to.
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Commit id of the target run.
    #[must_use]
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// Number of prior runs in the baseline window.
    #[must_use]
    pub const fn baseline_runs(&self) -> usize {
        self.baseline_runs
    }

    /// One verdict per measurement shared by the target and the baseline,
    /// in the target run's measurement order.
    #[must_use]
    pub fn verdicts(&self) -> &[RegressionVerdict] {
        &self.verdicts
    }

    /// Measurements that could not be compared.
    #[must_use]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Verdict for a single measurement, if it was compared.
    #[must_use]
    pub fn verdict_for(&self, measurement: &str) -> Option<&RegressionVerdict> {
        self.verdicts
            .iter()
            .find(|v| v.measurement_name == measurement)
    }

    /// Verdicts classified as regressions.
    pub fn regressions(&self) -> impl Iterator<Item = &RegressionVerdict> + '_ {
        self.with_verdict(Verdict::Regression)
    }

    /// Verdicts classified as improvements.
    pub fn improvements(&self) -> impl Iterator<Item = &RegressionVerdict> + '_ {
        self.with_verdict(Verdict::Improvement)
    }

    /// Check if any measurement regressed.
    #[must_use]
    pub fn has_regressions(&self) -> bool {
        self.regressions().next().is_some()
    }

    /// Check if a regression is severe enough to fail the CI job.
    ///
    /// A regression fails the job when its ratio reaches the fail threshold
    /// in the worse direction. Always `false` without a fail threshold.
    #[must_use]
    pub fn should_fail(&self) -> bool {
        let Some(fail) = self.fail_threshold else {
            return false;
        };
        self.regressions().any(|v| {
            v.delta_ratio
                .is_some_and(|ratio| ratio >= fail || ratio <= fail.recip())
        })
    }

    fn with_verdict(&self, verdict: Verdict) -> impl Iterator<Item = &RegressionVerdict> + '_ {
        self.verdicts.iter().filter(move |v| v.verdict == verdict)
    }
}

impl fmt::Display for DetectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Benchmark '{}' at {} vs {} prior run(s), threshold {:.2}",
            self.suite_name, self.commit_id, self.baseline_runs, self.alert_threshold
        )?;
        if self.verdicts.is_empty() {
            return writeln!(f, "  (no comparable measurements)");
        }
        for v in &self.verdicts {
            let ratio = v
                .delta_ratio
                .map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
            writeln!(
                f,
                "  {:<11} {}: {} {} -> {} {} (ratio {})",
                v.verdict,
                v.measurement_name,
                v.baseline_value,
                v.unit,
                v.current_value,
                v.unit,
                ratio
            )?;
        }
        for anomaly in &self.anomalies {
            match anomaly {
                Anomaly::ZeroBaseline {
                    measurement_name, ..
                } => writeln!(f, "  anomaly     {measurement_name}: baseline is zero")?,
            }
        }
        Ok(())
    }
}
