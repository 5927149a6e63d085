use serde::{Deserialize, Serialize};

use crate::processing::credible::{CredibleInterval, SigmaLevel};
use crate::processing::percentile::{percentile, sorted_finite};

/// Summary of one parameter's posterior samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalSummary {
    pub name: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub sigma_1: CredibleInterval,
    pub sigma_2: CredibleInterval,
}

impl MarginalSummary {
    /// Compute the summary from raw samples, filtering out non-finite values.
    pub fn compute(name: &str, values: &[f64]) -> Option<Self> {
        let sorted = sorted_finite(values);
        let count = sorted.len();
        if count == 0 {
            return None;
        }

        let min = sorted[0];
        let max = sorted[count - 1];
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let median = percentile(&sorted, 50.0)?;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            name: name.to_string(),
            count,
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
            sigma_1: CredibleInterval::from_sorted(&sorted, SigmaLevel::One)?,
            sigma_2: CredibleInterval::from_sorted(&sorted, SigmaLevel::Two)?,
        })
    }

    /// Format as a multi-line report string.
    pub fn report(&self) -> String {
        format!(
            "{}:\n  Samples: {}\n  Mean: {:.4}\n  Median: {:.4}\n  Std Dev: {:.4}\n  Range: [{:.4}, {:.4}]\n  {}: [{:.4}, {:.4}] width {:.4}\n  {}: [{:.4}, {:.4}] width {:.4}\n",
            self.name,
            self.count,
            self.mean,
            self.median,
            self.std_dev,
            self.min,
            self.max,
            SigmaLevel::One.label(),
            self.sigma_1.low,
            self.sigma_1.high,
            self.sigma_1.width(),
            SigmaLevel::Two.label(),
            self.sigma_2.low,
            self.sigma_2.high,
            self.sigma_2.width(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_basic_moments() {
        let s = MarginalSummary::compute("a", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.median - 3.0).abs() < 1e-12);
        assert!((s.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_summary_intervals_are_nested() {
        let v: Vec<f64> = (0..500).map(|i| ((i * 37) % 500) as f64).collect();
        let s = MarginalSummary::compute("b", &v).unwrap();
        assert!(s.sigma_2.low <= s.sigma_1.low);
        assert!(s.sigma_1.high <= s.sigma_2.high);
        assert!(s.sigma_1.low <= s.median && s.median <= s.sigma_1.high);
    }

    #[test]
    fn test_summary_skips_nan_and_empty() {
        let s = MarginalSummary::compute("c", &[f64::NAN, 2.0]).unwrap();
        assert_eq!(s.count, 1);
        assert!(MarginalSummary::compute("d", &[f64::NAN]).is_none());
    }

    #[test]
    fn test_report_mentions_bands() {
        let s = MarginalSummary::compute("theta", &[0.0, 1.0]).unwrap();
        let r = s.report();
        assert!(r.starts_with("theta:"));
        // 84.1 - 15.9 percentiles of {0, 1}
        assert!(r.contains("[0.1590, 0.8410] width 0.6820"));
        assert!(r.contains("1σ (68%)"));
        assert!(r.contains("2σ (95%)"));
    }
}
