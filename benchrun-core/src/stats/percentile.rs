/// Percentile of already sorted samples by linear interpolation.
///
/// The rank is `p / 100 * (n - 1)`; the result interpolates between the two
/// order statistics bracketing that rank. Callers guarantee `sorted` is
/// non-empty and `percentile` lies in `[0, 100]`.
pub(crate) fn interpolate(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = percentile / 100.0 * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    // Weighted form keeps p50 bit-identical to the two-point median average.
    sorted[lower_idx] * (1.0 - fraction) + sorted[upper_idx] * fraction
}

/// Median of already sorted, non-empty samples.
pub(crate) fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_endpoints() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(interpolate(&sorted, 0.0), 1.0);
        assert_eq!(interpolate(&sorted, 100.0), 5.0);
    }

    #[test]
    fn test_interpolate_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // rank = 0.25 * 3 = 0.75
        assert!((interpolate(&sorted, 25.0) - 1.75).abs() < 1e-12);
        // rank = 0.9 * 3 = 2.7
        assert!((interpolate(&sorted, 90.0) - 3.7).abs() < 1e-12);
    }

    #[test]
    fn test_interpolate_single_sample() {
        assert_eq!(interpolate(&[42.0], 0.0), 42.0);
        assert_eq!(interpolate(&[42.0], 73.0), 42.0);
    }

    #[test]
    fn test_quartiles_of_range() {
        let sorted: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert!((interpolate(&sorted, 25.0) - 25.75).abs() < 1e-9);
        assert!((interpolate(&sorted, 75.0) - 75.25).abs() < 1e-9);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 10.0]), 2.5);
    }

    #[test]
    fn test_p50_matches_median() {
        let odd = [0.1, 0.3, 0.7, 1.1, 2.9];
        let even = [0.1, 0.3, 0.7, 1.1, 2.9, 3.3];
        assert_eq!(interpolate(&odd, 50.0), median(&odd));
        assert_eq!(interpolate(&even, 50.0), median(&even));
    }
}
