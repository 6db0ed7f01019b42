//! Summary statistics over section readings.

use super::types::{AnalyzerError, Reading, Statistics};

impl Statistics {
    /// Compute statistics from nanosecond readings.
    pub fn from_readings(readings: &[Reading]) -> Result<Self, AnalyzerError> {
        let samples: Vec<f64> = readings.iter().map(|&r| r as f64).collect();
        Self::from_samples(&samples)
    }

    /// Compute mean, extremes and population variance, skipping NaN samples.
    ///
    /// # Returns
    ///
    /// `Err(AnalyzerError::InvalidInput)` when the slice is empty or holds
    /// only NaNs.
    pub fn from_samples(samples: &[f64]) -> Result<Self, AnalyzerError> {
        let values: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return Err(AnalyzerError::InvalidInput("statistics need at least one reading".to_string()));
        }

        let count = values.len() as f64;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        // Rounding in the sum can push the mean just outside [min, max].
        let mean = (values.iter().sum::<f64>() / count).clamp(min, max);
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;

        Ok(Self {
            mean,
            max,
            min,
            std_dev: variance.sqrt(),
            variance,
            samples: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_distr::{Distribution, Normal};

    #[test]
    fn constant_readings_have_zero_spread() {
        let stats = Statistics::from_readings(&[500_000_000, 500_000_000]).unwrap();
        assert_eq!(stats.mean, 500_000_000.0);
        assert_eq!(stats.max, 500_000_000.0);
        assert_eq!(stats.min, 500_000_000.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.samples, 2);
    }

    #[test]
    fn population_variance() {
        let stats = Statistics::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.variance, 4.0);
        assert_eq!(stats.std_dev, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.min, 2.0);
    }

    #[test]
    fn nan_samples_are_skipped() {
        let stats = Statistics::from_samples(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.max, 3.0);
        assert!(!stats.std_dev.is_nan());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(Statistics::from_readings(&[]), Err(AnalyzerError::InvalidInput(_))));
        assert!(matches!(Statistics::from_samples(&[f64::NAN]), Err(AnalyzerError::InvalidInput(_))));
    }

    #[test]
    fn repeated_fractional_value_keeps_ordering() {
        let stats = Statistics::from_samples(&[0.1, 0.1, 0.1]).unwrap();
        assert!(stats.max >= stats.mean && stats.mean >= stats.min);
    }

    #[test]
    fn ordering_and_variance_hold_for_random_readings() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5_6_7);
        let normal = Normal::<f64>::new(2_000_000.0, 350_000.0).unwrap();
        for _ in 0..200 {
            let len = rng.gen_range(1..64);
            let readings: Vec<Reading> = (0..len).map(|_| normal.sample(&mut rng).max(0.0) as Reading).collect();
            let stats = Statistics::from_readings(&readings).unwrap();
            assert!(stats.max >= stats.mean, "{:?}", stats);
            assert!(stats.mean >= stats.min, "{:?}", stats);
            let squared = stats.std_dev * stats.std_dev;
            assert!((stats.variance - squared).abs() <= 1e-9 * stats.variance.max(1.0), "{:?}", stats);
        }
    }
}
