use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

/// Errors produced while building or aggregating samples.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Statistics were requested for a sample set with no elements.
    #[error("Cannot summarize an empty sample set")]
    EmptySample,

    /// A percentile outside `[0, 100]` was requested.
    #[error("Invalid percentile {0}: must be within [0, 100]")]
    InvalidPercentile(f64),

    /// A duration was negative, NaN or infinite.
    #[error("Invalid duration {value} at index {index}: durations must be finite and non-negative")]
    InvalidDuration { index: usize, value: f64 },
}

/// Durations in seconds of the timed trials of one run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSet {
    durations: Vec<f64>,
}

impl SampleSet {
    /// Build a sample set, rejecting negative or non-finite durations.
    pub fn new(durations: Vec<f64>) -> Result<Self, StatsError> {
        if let Some((index, &value)) = durations
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d < 0.0)
        {
            return Err(StatsError::InvalidDuration { index, value });
        }
        Ok(Self { durations })
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            durations: Vec::with_capacity(capacity),
        }
    }

    /// Append a duration measured by a monotonic clock.
    pub(crate) fn push(&mut self, duration: f64) {
        debug_assert!(duration.is_finite() && duration >= 0.0);
        self.durations.push(duration);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.durations.iter().copied()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.durations
    }
}

/// How much the samples of a run vary relative to their mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    /// Coefficient of variation below 5%.
    VeryStable,
    /// Below 10%.
    Stable,
    /// Below 20%.
    Moderate,
    Unstable,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::VeryStable => write!(f, "Very Stable"),
            Stability::Stable => write!(f, "Stable"),
            Stability::Moderate => write!(f, "Moderate"),
            Stability::Unstable => write!(f, "Unstable"),
        }
    }
}

/// Descriptive statistics of a [`SampleSet`], all values in seconds.
///
/// Guarantees `min <= median <= max`, `min <= mean <= max` and
/// `variance == std_dev²`. A single sample has zero dispersion.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticalSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (Bessel's correction).
    pub std_dev: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
    #[serde(skip)]
    sorted: Vec<f64>,
}

impl StatisticalSummary {
    /// Percentile `p` in `[0, 100]`, interpolated linearly between the two
    /// order statistics bracketing rank `p / 100 * (count - 1)`.
    pub fn percentile(&self, p: f64) -> Result<f64, StatsError> {
        validate_percentile(p)?;
        Ok(percentile::interpolate(&self.sorted, p))
    }

    /// Standard deviation as a percentage of the mean.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }

    pub fn stability(&self) -> Stability {
        let cv = self.coefficient_of_variation();
        if cv < 5.0 {
            Stability::VeryStable
        } else if cv < 10.0 {
            Stability::Stable
        } else if cv < 20.0 {
            Stability::Moderate
        } else {
            Stability::Unstable
        }
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        percentile::interpolate(&self.sorted, 75.0) - percentile::interpolate(&self.sorted, 25.0)
    }

    /// The samples in ascending order.
    pub fn sorted_samples(&self) -> &[f64] {
        &self.sorted
    }
}

/// Compute the descriptive statistics of a non-empty sample set.
pub fn summarize(samples: &SampleSet) -> Result<StatisticalSummary, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySample);
    }

    let mut sorted = samples.as_slice().to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let min = sorted[0];
    let max = sorted[count - 1];

    // Rounding may push the mean past an extreme when all samples are close.
    let mean = Statistics::mean(samples.as_slice()).clamp(min, max);

    // Identical samples have no dispersion, whatever rounding statrs leaves behind.
    let variance = if count > 1 && min < max {
        Statistics::variance(samples.as_slice()).max(0.0)
    } else {
        0.0
    };
    let std_dev = variance.sqrt();

    Ok(StatisticalSummary {
        count,
        mean,
        median: percentile::median(&sorted),
        std_dev,
        variance,
        min,
        max,
        p95: percentile::interpolate(&sorted, 95.0),
        p99: percentile::interpolate(&sorted, 99.0),
        sorted,
    })
}

pub(crate) fn validate_percentile(p: f64) -> Result<(), StatsError> {
    if (0.0..=100.0).contains(&p) {
        Ok(())
    } else {
        Err(StatsError::InvalidPercentile(p))
    }
}

mod percentile;

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> SampleSet {
        SampleSet::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_summarize_known_values() {
        let summary = summarize(&samples(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert!((summary.std_dev - 2.5_f64.sqrt()).abs() < 1e-9);
        assert!((summary.variance - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_is_order_invariant() {
        let a = summarize(&samples(&[5.0, 1.0, 4.0, 2.0, 3.0])).unwrap();
        let b = summarize(&samples(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();

        assert!((a.mean - b.mean).abs() < 1e-12);
        assert_eq!(a.median, b.median);
        assert!((a.std_dev - b.std_dev).abs() < 1e-12);
        assert_eq!(a.sorted_samples(), b.sorted_samples());
    }

    #[test]
    fn test_single_sample_has_no_dispersion() {
        let summary = summarize(&samples(&[0.25])).unwrap();

        assert_eq!(summary.count, 1);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.mean, 0.25);
        assert_eq!(summary.median, 0.25);
        assert_eq!(summary.percentile(99.0).unwrap(), 0.25);
    }

    #[test]
    fn test_empty_sample_set_fails() {
        let result = summarize(&SampleSet::default());
        assert_eq!(result.unwrap_err(), StatsError::EmptySample);
    }

    #[test]
    fn test_even_count_median_averages_center() {
        let summary = summarize(&samples(&[4.0, 1.0, 3.0, 2.0])).unwrap();
        assert_eq!(summary.median, 2.5);
    }

    #[test]
    fn test_invariants_hold_for_identical_samples() {
        let summary = summarize(&samples(&[0.1; 7])).unwrap();

        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
        assert!(summary.min <= summary.median && summary.median <= summary.max);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.variance, 0.0);
    }

    #[test]
    fn test_identical_inexact_samples_have_no_dispersion() {
        for value in [0.1, 0.3, 1e-7, 123.456] {
            let summary = summarize(&samples(&[value; 13])).unwrap();
            assert_eq!(summary.std_dev, 0.0, "value {value}");
            assert_eq!(summary.coefficient_of_variation(), 0.0);
        }
    }

    #[test]
    fn test_variance_is_std_dev_squared() {
        let summary = summarize(&samples(&[0.0012, 0.0010, 0.0013, 0.0011, 0.0010])).unwrap();
        assert!((summary.variance - summary.std_dev.powi(2)).abs() < 1e-18);
        assert!(summary.std_dev >= 0.0);
    }

    #[test]
    fn test_percentile_bounds() {
        let summary = summarize(&samples(&[1.0, 2.0, 3.0])).unwrap();

        assert_eq!(summary.percentile(0.0).unwrap(), 1.0);
        assert_eq!(summary.percentile(100.0).unwrap(), 3.0);
        assert_eq!(
            summary.percentile(100.5).unwrap_err(),
            StatsError::InvalidPercentile(100.5)
        );
        assert!(matches!(
            summary.percentile(-1.0),
            Err(StatsError::InvalidPercentile(_))
        ));
        assert!(summary.percentile(f64::NAN).is_err());
    }

    #[test]
    fn test_percentile_50_equals_median() {
        for values in [
            vec![0.3, 0.1, 0.2],
            vec![0.4, 0.1, 0.3, 0.2],
            vec![1.5, 9.25, 0.125, 3.0, 7.75, 2.5],
        ] {
            let summary = summarize(&samples(&values)).unwrap();
            assert_eq!(summary.percentile(50.0).unwrap(), summary.median);
        }
    }

    #[test]
    fn test_p95_and_p99() {
        let values: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let summary = summarize(&samples(&values)).unwrap();

        assert!((summary.p95 - 95.05).abs() < 1e-9);
        assert!((summary.p99 - 99.01).abs() < 1e-9);
    }

    #[test]
    fn test_sample_set_rejects_invalid_durations() {
        assert_eq!(
            SampleSet::new(vec![0.1, -0.2]).unwrap_err(),
            StatsError::InvalidDuration {
                index: 1,
                value: -0.2
            }
        );
        assert!(SampleSet::new(vec![f64::INFINITY]).is_err());
        assert!(SampleSet::new(vec![f64::NAN]).is_err());
        assert!(SampleSet::new(vec![0.0]).is_ok());
    }

    #[test]
    fn test_sample_set_preserves_order() {
        let set = samples(&[0.3, 0.1, 0.2]);
        assert_eq!(set.as_slice(), &[0.3, 0.1, 0.2]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0.3, 0.1, 0.2]);
    }

    #[test]
    fn test_stability_classification() {
        let steady = summarize(&samples(&[1.0, 1.01, 0.99, 1.0])).unwrap();
        assert_eq!(steady.stability(), Stability::VeryStable);

        let noisy = summarize(&samples(&[1.0, 3.0, 0.5, 2.0])).unwrap();
        assert_eq!(noisy.stability(), Stability::Unstable);
        assert!(noisy.coefficient_of_variation() > 20.0);
    }

    #[test]
    fn test_iqr() {
        let values: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let summary = summarize(&samples(&values)).unwrap();
        assert!((summary.iqr() - 49.5).abs() < 1e-9);
    }
}
