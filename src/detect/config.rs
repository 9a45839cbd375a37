//! Detector configuration

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default alert threshold: flag a run that is twice as slow (200%).
pub const DEFAULT_ALERT_THRESHOLD: f64 = 2.0;

/// How many prior runs form the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// Every run before the target.
    All,
    /// The `k` runs immediately before the target (`k >= 1`).
    Last(usize),
}

/// Statistic used to summarize the baseline window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatistic {
    /// Arithmetic mean of baseline values.
    Mean,
    /// Value from the most recent baseline run.
    Last,
    /// Mean shifted by `multiple` standard deviations toward the worse
    /// direction, so only changes beyond the usual spread get flagged.
    /// A downward shift that would reach zero falls back to the mean.
    MeanStdDev {
        /// Number of sample standard deviations
        multiple: f64,
    },
}

/// Which way is better for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Lower values are better (time, memory).
    SmallerIsBetter,
    /// Higher values are better (throughput).
    BiggerIsBetter,
}

/// Regression detection policy.
///
/// ## Defaults
///
/// - `window`: `Last(1)` (compare against the previous run)
/// - `statistic`: `Mean`
/// - `alert_threshold`: 2.0
/// - `fail_threshold`: none
/// - `direction`: `SmallerIsBetter`
/// - `noise_gate`: on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    window: Window,
    statistic: BaselineStatistic,
    alert_threshold: f64,
    fail_threshold: Option<f64>,
    direction: Direction,
    overrides: FxHashMap<String, Direction>,
    noise_gate: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: Window::Last(1),
            statistic: BaselineStatistic::Mean,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            fail_threshold: None,
            direction: Direction::SmallerIsBetter,
            overrides: FxHashMap::default(),
            noise_gate: true,
        }
    }
}

impl DetectorConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::default()
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed JSON and `Error::InvalidConfig`
    /// for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the baseline window.
    #[must_use]
    pub const fn window(&self) -> Window {
        self.window
    }

    /// Get the baseline statistic.
    #[must_use]
    pub const fn statistic(&self) -> BaselineStatistic {
        self.statistic
    }

    /// Get the alert threshold ratio.
    #[must_use]
    pub const fn alert_threshold(&self) -> f64 {
        self.alert_threshold
    }

    /// Get the fail threshold ratio, if set.
    #[must_use]
    pub const fn fail_threshold(&self) -> Option<f64> {
        self.fail_threshold
    }

    /// Check if the noise gate is enabled.
    #[must_use]
    pub const fn noise_gate(&self) -> bool {
        self.noise_gate
    }

    /// Direction that applies to a measurement.
    #[must_use]
    pub fn direction_for(&self, measurement: &str) -> Direction {
        self.overrides
            .get(measurement)
            .copied()
            .unwrap_or(self.direction)
    }

    /// Check that the configuration can drive a detection.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the window is `Last(0)`, a
    /// threshold is not finite or not above 1, the fail threshold is below
    /// the alert threshold, or a standard-deviation multiple is negative.
    pub fn validate(&self) -> Result<()> {
        if self.window == Window::Last(0) {
            return Err(Error::InvalidConfig(
                "window must cover at least one prior run".to_string(),
            ));
        }
        if !self.alert_threshold.is_finite() || self.alert_threshold <= 1.0 {
            return Err(Error::InvalidConfig(format!(
                "alert threshold must be a finite ratio above 1.0, got {}",
                self.alert_threshold
            )));
        }
        if let Some(fail) = self.fail_threshold {
            if !fail.is_finite() || fail < self.alert_threshold {
                return Err(Error::InvalidConfig(format!(
                    "fail threshold {fail} must be finite and >= alert threshold {}",
                    self.alert_threshold
                )));
            }
        }
        if let BaselineStatistic::MeanStdDev { multiple } = self.statistic {
            if !multiple.is_finite() || multiple < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "standard deviation multiple must be finite and >= 0, got {multiple}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for `DetectorConfig`.
#[derive(Debug, Default)]
pub struct DetectorConfigBuilder {
    config: DetectorConfig,
}

impl DetectorConfigBuilder {
    /// Set the baseline window.
    #[must_use]
    pub const fn window(mut self, window: Window) -> Self {
        self.config.window = window;
        self
    }

    /// Set the baseline statistic.
    #[must_use]
    pub const fn statistic(mut self, statistic: BaselineStatistic) -> Self {
        self.config.statistic = statistic;
        self
    }

    /// Set the alert threshold ratio.
    #[must_use]
    pub const fn alert_threshold(mut self, ratio: f64) -> Self {
        self.config.alert_threshold = ratio;
        self
    }

    /// Set the ratio at which a regression should fail the CI job.
    #[must_use]
    pub const fn fail_threshold(mut self, ratio: f64) -> Self {
        self.config.fail_threshold = Some(ratio);
        self
    }

    /// Set the default direction for all measurements.
    #[must_use]
    pub const fn direction(mut self, direction: Direction) -> Self {
        self.config.direction = direction;
        self
    }

    /// Override the direction for one measurement.
    #[must_use]
    pub fn direction_for(mut self, measurement: impl Into<String>, direction: Direction) -> Self {
        self.config.overrides.insert(measurement.into(), direction);
        self
    }

    /// Enable or disable the noise gate.
    #[must_use]
    pub const fn noise_gate(mut self, enabled: bool) -> Self {
        self.config.noise_gate = enabled;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the settings are inconsistent.
    pub fn build(self) -> Result<DetectorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
