use crate::error::{MarginalError, Result};

/// Default number of bins for a marginal histogram.
pub const DEFAULT_BINS: usize = 100;

/// Equal-width histogram over the finite range of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` monotonically increasing edges.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin the finite values into `bins` equal-width bins spanning `[min, max]`.
    ///
    /// Bins are half-open except the last one, which also takes the maximum.
    /// A constant sample is spread over `[v - 0.5, v + 0.5]`.
    pub fn compute(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(MarginalError::ZeroBins);
        }

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in values.iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return Err(MarginalError::EmptySample);
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let span = hi - lo;
        let step = span / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * step).collect();
        edges[bins] = hi;

        let mut counts = vec![0u64; bins];
        for &v in values.iter().filter(|v| v.is_finite()) {
            let idx = (((v - lo) / span) * bins as f64).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        Ok(Self { edges, counts })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn left_edges(&self) -> &[f64] {
        &self.edges[..self.edges.len() - 1]
    }

    pub fn centers(&self) -> Vec<f64> {
        let half = self.bin_width() / 2.0;
        self.left_edges().iter().map(|e| e + half).collect()
    }

    /// Counts scaled so the tallest bin is 1.0.
    pub fn normalized(&self) -> Vec<f64> {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts.iter().map(|&c| c as f64 / max as f64).collect()
    }
}
