use crate::error::{MarginalError, Result};
use crate::processing::credible::{BinSpan, CredibleInterval, SigmaLevel, FULL_RANGE_ALPHA};
use crate::processing::histogram::Histogram;
use crate::processing::percentile::sorted_finite;

/// Binned marginal of one parameter with its credible bands.
#[derive(Debug, Clone)]
pub struct Marginal {
    pub name: String,
    pub histogram: Histogram,
    /// Counts scaled so the tallest bin is 1.0.
    pub heights: Vec<f64>,
    pub sigma_1: CredibleInterval,
    pub sigma_2: CredibleInterval,
    pub span_1: Option<BinSpan>,
    pub span_2: Option<BinSpan>,
}

/// One shaded histogram layer, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramLayer {
    pub edges: Vec<f64>,
    pub heights: Vec<f64>,
    pub alpha: f32,
    pub label: Option<&'static str>,
}

impl HistogramLayer {
    pub fn bin_width(&self) -> f64 {
        if self.edges.len() < 2 {
            0.0
        } else {
            self.edges[1] - self.edges[0]
        }
    }

    /// Bar centres paired with their heights.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let half = self.bin_width() / 2.0;
        self.edges.iter().zip(&self.heights).map(move |(e, h)| (e + half, *h))
    }

    pub fn outline(&self) -> Vec<[f64; 2]> {
        step_outline(&self.edges, &self.heights)
    }
}

impl Marginal {
    pub fn compute(name: &str, values: &[f64], bins: usize) -> Result<Self> {
        let histogram = Histogram::compute(values, bins).map_err(|e| match e {
            MarginalError::EmptySample => MarginalError::NoFiniteValues(name.to_string()),
            other => other,
        })?;
        let sorted = sorted_finite(values);
        let no_values = || MarginalError::NoFiniteValues(name.to_string());
        let sigma_1 = CredibleInterval::from_sorted(&sorted, SigmaLevel::One).ok_or_else(no_values)?;
        let sigma_2 = CredibleInterval::from_sorted(&sorted, SigmaLevel::Two).ok_or_else(no_values)?;

        let span_1 = sigma_1.bin_span(&histogram);
        let span_2 = sigma_2.bin_span(&histogram);
        for (level, span) in [(SigmaLevel::One, &span_1), (SigmaLevel::Two, &span_2)] {
            if span.is_none() {
                tracing::warn!(
                    parameter = name,
                    band = level.label(),
                    "credible interval is narrower than one bin, band not drawn"
                );
            }
        }

        Ok(Self {
            name: name.to_string(),
            heights: histogram.normalized(),
            histogram,
            sigma_1,
            sigma_2,
            span_1,
            span_2,
        })
    }

    pub fn span(&self, level: SigmaLevel) -> Option<&BinSpan> {
        match level {
            SigmaLevel::One => self.span_1.as_ref(),
            SigmaLevel::Two => self.span_2.as_ref(),
        }
    }

    /// Full range, then 2σ, then 1σ so the narrowest band paints on top.
    pub fn layers(&self) -> Vec<HistogramLayer> {
        let mut layers = vec![HistogramLayer {
            edges: self.histogram.edges.clone(),
            heights: self.heights.clone(),
            alpha: FULL_RANGE_ALPHA,
            label: None,
        }];
        for level in [SigmaLevel::Two, SigmaLevel::One] {
            if let Some(span) = self.span(level) {
                layers.push(HistogramLayer {
                    edges: span.edges(&self.histogram),
                    heights: span.slice(&self.heights).to_vec(),
                    alpha: level.alpha(),
                    label: Some(level.label()),
                });
            }
        }
        layers
    }
}

/// Outline of a step histogram: up the left edge, across each bin top, and
/// back down the right edge.
pub fn step_outline(edges: &[f64], heights: &[f64]) -> Vec<[f64; 2]> {
    let n = heights.len().min(edges.len().saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }
    let mut points = Vec::with_capacity(2 * n + 2);
    points.push([edges[0], 0.0]);
    for i in 0..n {
        points.push([edges[i], heights[i]]);
        points.push([edges[i + 1], heights[i]]);
    }
    points.push([edges[n], 0.0]);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_marginal_has_three_layers_in_paint_order() {
        let m = Marginal::compute("x", &uniform(1001), 10).unwrap();
        let layers = m.layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].label, None);
        assert_eq!(layers[0].heights.len(), 10);
        assert_eq!(layers[1].label, Some("2σ (95%)"));
        assert_eq!(layers[2].label, Some("1σ (68%)"));
        assert_eq!(layers[2].alpha, 1.0);
    }

    #[test]
    fn test_band_layers_match_spans() {
        let m = Marginal::compute("x", &uniform(1001), 10).unwrap();
        let one = m.span(SigmaLevel::One).unwrap();
        let layer = &m.layers()[2];
        assert_eq!(layer.heights.len(), one.len());
        assert_eq!(layer.edges.len(), one.len() + 1);
        assert!((layer.bin_width() - m.histogram.bin_width()).abs() < 1e-12);
    }

    #[test]
    fn test_heights_normalized() {
        let m = Marginal::compute("x", &[0.0, 0.0, 0.0, 1.0], 2).unwrap();
        assert_eq!(m.heights, vec![1.0, 1.0 / 3.0]);
    }

    #[test]
    fn test_narrow_bands_are_skipped() {
        // All mass in one bin: the intervals collapse inside it.
        let mut v = vec![0.5; 100];
        v.push(0.0);
        v.push(1.0);
        let m = Marginal::compute("spike", &v, 4).unwrap();
        assert!(m.span_1.is_none());
        assert_eq!(m.layers().len(), 1);
    }

    #[test]
    fn test_error_names_parameter() {
        let err = Marginal::compute("tau", &[f64::NAN], 10).unwrap_err();
        assert!(err.to_string().contains("tau"));
    }

    #[test]
    fn test_layer_bars_are_centered() {
        let layer = HistogramLayer {
            edges: vec![0.0, 2.0, 4.0],
            heights: vec![0.5, 1.0],
            alpha: 1.0,
            label: None,
        };
        let bars: Vec<_> = layer.bars().collect();
        assert_eq!(bars, vec![(1.0, 0.5), (3.0, 1.0)]);
    }

    #[test]
    fn test_step_outline_shape() {
        let pts = step_outline(&[0.0, 1.0, 2.0], &[0.5, 1.0]);
        assert_eq!(
            pts,
            vec![
                [0.0, 0.0],
                [0.0, 0.5],
                [1.0, 0.5],
                [1.0, 1.0],
                [2.0, 1.0],
                [2.0, 0.0],
            ]
        );
        assert!(step_outline(&[0.0], &[]).is_empty());
    }
}
