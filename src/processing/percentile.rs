//! Percentiles with linear interpolation between closest ranks.

/// Percentile `q` (0..=100) of an ascending slice.
///
/// The rank is `q / 100 * (n - 1)`; fractional ranks interpolate between the
/// two neighbouring samples.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 100.0);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Sorted copy of the finite values.
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Several percentiles of the same ascending slice.
pub fn percentiles(sorted: &[f64], qs: &[f64]) -> Option<Vec<f64>> {
    qs.iter().map(|&q| percentile(sorted, q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_endpoints() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 100.0), Some(5.0));
        assert_eq!(percentile(&v, 50.0), Some(3.0));
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [0.0, 10.0];
        let p = percentile(&v, 15.9).unwrap();
        assert!((p - 1.59).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_matches_linear_rank() {
        // 101 samples 0..=100: percentile q is exactly q.
        let v: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        assert!((percentile(&v, 2.3).unwrap() - 2.3).abs() < 1e-9);
        assert!((percentile(&v, 97.7).unwrap() - 97.7).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_clamps_q() {
        let v = [1.0, 2.0];
        assert_eq!(percentile(&v, -5.0), Some(1.0));
        assert_eq!(percentile(&v, 150.0), Some(2.0));
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentiles(&sorted_finite(&[f64::NAN]), &[50.0]), None);
    }

    #[test]
    fn test_percentiles_sorts_and_skips_nan() {
        let sorted = sorted_finite(&[5.0, f64::NAN, 1.0, 3.0]);
        let p = percentiles(&sorted, &[0.0, 50.0, 100.0]).unwrap();
        assert_eq!(p, vec![1.0, 3.0, 5.0]);
    }
}
