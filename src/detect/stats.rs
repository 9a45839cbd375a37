//! Summary statistics over baseline samples

/// Arithmetic mean. `None` for an empty slice.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1). Zero for fewer than two samples.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    let Some(mu) = mean(values) else {
        return 0.0;
    };
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert!(mean(&[]).is_none());
        assert!((mean(&[1.0, 2.0, 3.0]).unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_std_dev() {
        assert!(sample_std_dev(&[]).abs() < f64::EPSILON);
        assert!(sample_std_dev(&[5.0]).abs() < f64::EPSILON);
        // var = ((2-5)^2 + (4-5)^2 + (6-5)^2 + (8-5)^2) / 3 = 20 / 3
        let expected = (20.0_f64 / 3.0).sqrt();
        assert!((sample_std_dev(&[2.0, 4.0, 6.0, 8.0]) - expected).abs() < 1e-12);
    }
}
