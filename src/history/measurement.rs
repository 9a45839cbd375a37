//! Measurement - one named, unit-bearing benchmark result

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Measurement represents a single benchmark result inside a run.
///
/// `value` is the primary statistic (e.g. mean time per iteration) and
/// `range` its spread (e.g. standard deviation). The `name`/`unit` pair is
/// fixed for the lifetime of a suite: once a suite has seen `"parse"` in
/// `"ns/iter"`, every later record must report `"parse"` in `"ns/iter"` too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    name: String,
    value: f64,
    range: f64,
    unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extra: Option<String>,
}

impl Measurement {
    /// Create a new measurement.
    ///
    /// # Arguments
    ///
    /// * `name` - Benchmark case name, unique within a run
    /// * `value` - Primary statistic
    /// * `range` - Uncertainty of `value`, never negative
    /// * `unit` - Unit of `value` and `range` (e.g. "ns/iter")
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64, range: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            range,
            unit: unit.into(),
            extra: None,
        }
    }

    /// Attach free-form tool output (sample counts, iteration details).
    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Get the benchmark name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the primary statistic.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Get the uncertainty.
    #[must_use]
    pub const fn range(&self) -> f64 {
        self.range
    }

    /// Get the unit.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Get the extra tool output, if any.
    #[must_use]
    pub fn extra(&self) -> Option<&str> {
        self.extra.as_deref()
    }

    /// Check the measurement on its own, without any history.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the name is empty, or if the value or
    /// range is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("measurement name is empty".to_string()));
        }
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(Error::Validation(format!(
                "measurement '{}' has invalid value {} (must be finite and >= 0)",
                self.name, self.value
            )));
        }
        if !self.range.is_finite() || self.range < 0.0 {
            return Err(Error::Validation(format!(
                "measurement '{}' has invalid range {} (must be finite and >= 0)",
                self.name, self.range
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_new() {
        let m = Measurement::new("building", 100.0, 5.0, "ns/iter");
        assert_eq!(m.name(), "building");
        assert!((m.value() - 100.0).abs() < f64::EPSILON);
        assert!((m.range() - 5.0).abs() < f64::EPSILON);
        assert_eq!(m.unit(), "ns/iter");
        assert!(m.extra().is_none());
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_measurement_rejects_negative_range() {
        let m = Measurement::new("building", 100.0, -1.0, "ns/iter");
        assert!(matches!(m.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_measurement_rejects_negative_value() {
        let m = Measurement::new("building", -100.0, 1.0, "ns/iter");
        assert!(matches!(m.validate(), Err(Error::Validation(ref msg)) if msg.contains("-100")));
        assert!(Measurement::new("building", 0.0, 0.0, "ns/iter").validate().is_ok());
    }

    #[test]
    fn test_measurement_rejects_nan_value() {
        let m = Measurement::new("building", f64::NAN, 0.0, "ns/iter");
        assert!(matches!(m.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_measurement_rejects_blank_name() {
        let m = Measurement::new("  ", 1.0, 0.0, "ns/iter");
        assert!(matches!(m.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_extra_is_omitted_when_absent() {
        let json = serde_json::to_string(&Measurement::new("a", 1.0, 0.0, "ns")).unwrap();
        assert!(!json.contains("extra"));

        let json = serde_json::to_string(
            &Measurement::new("a", 1.0, 0.0, "ns").with_extra("100 samples"),
        )
        .unwrap();
        assert!(json.contains("\"extra\":\"100 samples\""));
    }
}
