use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::processing::histogram::Histogram;
use crate::processing::percentile::percentiles;

/// Fill alpha of the full-range layer behind the credible bands.
pub const FULL_RANGE_ALPHA: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigmaLevel {
    One,
    Two,
}

impl SigmaLevel {
    pub const ALL: [SigmaLevel; 2] = [SigmaLevel::One, SigmaLevel::Two];

    /// Lower and upper percentile bounding the band.
    pub fn percentiles(&self) -> (f64, f64) {
        match self {
            SigmaLevel::One => (15.9, 84.1),
            SigmaLevel::Two => (2.3, 97.7),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SigmaLevel::One => "1σ (68%)",
            SigmaLevel::Two => "2σ (95%)",
        }
    }

    pub fn alpha(&self) -> f32 {
        match self {
            SigmaLevel::One => 1.0,
            SigmaLevel::Two => 0.7,
        }
    }
}

/// Percentile interval of a sample at a given sigma level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredibleInterval {
    pub level: SigmaLevel,
    pub low: f64,
    pub high: f64,
}

impl CredibleInterval {
    /// `sorted` must be ascending and finite.
    pub fn from_sorted(sorted: &[f64], level: SigmaLevel) -> Option<Self> {
        let (lo_q, hi_q) = level.percentiles();
        match percentiles(sorted, &[lo_q, hi_q])?.as_slice() {
            &[low, high] => Some(Self { level, low, high }),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Bins lying entirely inside the interval.
    ///
    /// Edges are monotonic so the selected bins are contiguous. Returns `None`
    /// when no bin fits, e.g. an interval narrower than one bin.
    pub fn bin_span(&self, hist: &Histogram) -> Option<BinSpan> {
        let inside = |i: usize| hist.edges[i] >= self.low && hist.edges[i + 1] <= self.high;
        let start = (0..hist.len()).find(|&i| inside(i))?;
        let end = (start..hist.len())
            .take_while(|&i| inside(i))
            .last()
            .map_or(start, |i| i + 1);
        Some(BinSpan { bins: start..end })
    }
}

/// Contiguous run of histogram bins inside a credible interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinSpan {
    pub bins: Range<usize>,
}

impl BinSpan {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn contains(&self, bin: usize) -> bool {
        self.bins.contains(&bin)
    }

    /// Left edges of the selected bins plus the closing right edge.
    pub fn edges(&self, hist: &Histogram) -> Vec<f64> {
        let mut edges = hist.edges[self.bins.clone()].to_vec();
        if let Some(&last) = edges.last() {
            edges.push(last + hist.bin_width());
        }
        edges
    }

    pub fn slice<'a, T>(&self, per_bin: &'a [T]) -> &'a [T] {
        &per_bin[self.bins.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_sigma_constants() {
        assert_eq!(SigmaLevel::One.percentiles(), (15.9, 84.1));
        assert_eq!(SigmaLevel::Two.percentiles(), (2.3, 97.7));
        assert_eq!(SigmaLevel::One.label(), "1σ (68%)");
        assert_eq!(SigmaLevel::Two.label(), "2σ (95%)");
        assert!(SigmaLevel::One.alpha() > SigmaLevel::Two.alpha());
        assert!(SigmaLevel::Two.alpha() > FULL_RANGE_ALPHA);
    }

    #[test]
    fn test_interval_on_uniform_sample() {
        let v = uniform(1001);
        let one = CredibleInterval::from_sorted(&v, SigmaLevel::One).unwrap();
        assert!((one.low - 0.159).abs() < 1e-9);
        assert!((one.high - 0.841).abs() < 1e-9);
        let two = CredibleInterval::from_sorted(&v, SigmaLevel::Two).unwrap();
        assert!(two.width() > one.width());
    }

    #[test]
    fn test_bin_span_requires_both_edges_inside() {
        let v = uniform(1001);
        let hist = Histogram::compute(&v, 10).unwrap();
        let one = CredibleInterval::from_sorted(&v, SigmaLevel::One).unwrap();
        // [0.159, 0.841] fully contains bins [0.2, 0.3) .. [0.7, 0.8)
        let span = one.bin_span(&hist).unwrap();
        assert_eq!(span.bins, 2..8);
        assert!(span.contains(2));
        assert!(!span.contains(1));
        assert!(!span.contains(8));
    }

    #[test]
    fn test_span_edges_close_last_bin() {
        let v = uniform(1001);
        let hist = Histogram::compute(&v, 10).unwrap();
        let span = BinSpan { bins: 2..5 };
        let edges = span.edges(&hist);
        assert_eq!(edges.len(), 4);
        assert!((edges[0] - 0.2).abs() < 1e-12);
        assert!((edges[3] - 0.5).abs() < 1e-12);
        assert_eq!(span.slice(&hist.counts).len(), 3);
    }

    #[test]
    fn test_narrow_interval_selects_nothing() {
        let interval = CredibleInterval {
            level: SigmaLevel::One,
            low: 0.42,
            high: 0.48,
        };
        let hist = Histogram::compute(&uniform(11), 2).unwrap();
        assert_eq!(interval.bin_span(&hist), None);
    }

    #[test]
    fn test_wide_interval_selects_all_bins() {
        let interval = CredibleInterval {
            level: SigmaLevel::Two,
            low: -1.0,
            high: 2.0,
        };
        let hist = Histogram::compute(&uniform(11), 4).unwrap();
        assert_eq!(interval.bin_span(&hist).unwrap().bins, 0..4);
    }
}
