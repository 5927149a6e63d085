use serde::{Deserialize, Serialize};

use crate::error::{MarginalError, Result};
use crate::processing::marginal::Marginal;

/// matplotlib's default colour cycle, addressed as `C0`..`C9`.
pub const COLOR_CYCLE: [[u8; 4]; 10] = [
    [31, 119, 180, 255],  // C0 blue
    [255, 127, 14, 255],  // C1 orange
    [44, 160, 44, 255],   // C2 green
    [214, 39, 40, 255],   // C3 red
    [148, 103, 189, 255], // C4 purple
    [140, 86, 75, 255],   // C5 brown
    [227, 119, 194, 255], // C6 pink
    [127, 127, 127, 255], // C7 gray
    [188, 189, 34, 255],  // C8 olive
    [23, 190, 207, 255],  // C9 cyan
];

pub fn color_for_index(index: usize) -> [u8; 4] {
    COLOR_CYCLE[index % COLOR_CYCLE.len()]
}

/// Parse `C0`..`C9` or `#rrggbb`.
pub fn parse_color(text: &str) -> Result<[u8; 4]> {
    let text = text.trim();
    let unknown = || MarginalError::UnknownColor(text.to_string());

    if let Some(idx) = text.strip_prefix('C').or_else(|| text.strip_prefix('c')) {
        let idx: usize = idx.parse().map_err(|_| unknown())?;
        return COLOR_CYCLE.get(idx).copied().ok_or_else(unknown);
    }
    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(unknown());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| unknown());
        return Ok([channel(0)?, channel(2)?, channel(4)?, 255]);
    }
    Err(unknown())
}

/// Non-finite samples are written as `null`, which JSON can represent.
mod samples {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

static NEXT_SERIES_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

fn next_series_id() -> u64 {
    NEXT_SERIES_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

/// Samples of one parameter plus its binned marginal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginalSeries {
    pub id: u64,
    pub label: String,
    #[serde(with = "samples")]
    pub values: Vec<f64>,
    pub color: [u8; 4],
    pub visible: bool,
    #[serde(skip)]
    marginal: Option<Marginal>,
    /// Bin count the cached marginal was computed with.
    #[serde(skip)]
    cached_bins: usize,
    /// Bin count and label of the last failed computation.
    #[serde(skip)]
    failed: Option<(usize, String)>,
}

impl MarginalSeries {
    pub fn new(label: String, values: Vec<f64>, color: [u8; 4]) -> Self {
        Self {
            id: next_series_id(),
            label,
            values,
            color,
            visible: true,
            marginal: None,
            cached_bins: 0,
            failed: None,
        }
    }

    /// Binned marginal at `bins`, recomputed when the bin count changes.
    pub fn marginal(&mut self, bins: usize) -> Result<&Marginal> {
        let cached = self
            .marginal
            .take()
            .filter(|m| self.cached_bins == bins && m.name == self.label);
        let marginal = match cached {
            Some(m) => m,
            None => match Marginal::compute(&self.label, &self.values, bins) {
                Ok(m) => m,
                Err(e) => {
                    self.failed = Some((bins, self.label.clone()));
                    return Err(e);
                }
            },
        };
        self.failed = None;
        self.cached_bins = bins;
        Ok(self.marginal.insert(marginal))
    }

    /// Whether the last attempt at `bins` failed and nothing has changed since.
    pub fn has_failed(&self, bins: usize) -> bool {
        self.failed
            .as_ref()
            .is_some_and(|(b, label)| *b == bins && *label == self.label)
    }

    pub fn color32(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.color[0], self.color[1], self.color[2], self.color[3])
    }

    pub fn sample_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cycle_colors() {
        assert_eq!(parse_color("C0").unwrap(), [31, 119, 180, 255]);
        assert_eq!(parse_color("c3").unwrap(), COLOR_CYCLE[3]);
        assert!(parse_color("C10").is_err());
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#ff8000").unwrap(), [255, 128, 0, 255]);
        assert!(parse_color("#ff80").is_err());
        assert!(parse_color("#gg0000").is_err());
        assert!(matches!(parse_color("blue"), Err(MarginalError::UnknownColor(_))));
    }

    #[test]
    fn test_color_cycle_wraps() {
        assert_eq!(color_for_index(12), COLOR_CYCLE[2]);
    }

    #[test]
    fn test_marginal_cache_follows_bins() {
        let values: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let mut s = MarginalSeries::new("x".to_string(), values, COLOR_CYCLE[0]);
        assert_eq!(s.marginal(10).unwrap().histogram.len(), 10);
        assert_eq!(s.marginal(20).unwrap().histogram.len(), 20);
        s.label = "renamed".to_string();
        assert_eq!(s.marginal(20).unwrap().name, "renamed");
    }

    #[test]
    fn test_failure_is_remembered_per_bins_and_label() {
        let mut s = MarginalSeries::new("bad".to_string(), vec![f64::NAN], COLOR_CYCLE[0]);
        assert!(!s.has_failed(10));
        assert!(s.marginal(10).is_err());
        assert!(s.has_failed(10));
        assert!(!s.has_failed(20));
        s.label = "renamed".to_string();
        assert!(!s.has_failed(10));
    }

    #[test]
    fn test_missing_samples_serialize_as_null() {
        let s = MarginalSeries::new("x".into(), vec![1.0, f64::NAN, f64::INFINITY], COLOR_CYCLE[0]);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("[1.0,null,null]"));
        let back: MarginalSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back.values[0], 1.0);
        assert!(back.values[1].is_nan() && back.values[2].is_nan());
    }

    #[test]
    fn test_series_ids_unique() {
        let a = MarginalSeries::new("a".into(), vec![], COLOR_CYCLE[0]);
        let b = MarginalSeries::new("b".into(), vec![], COLOR_CYCLE[0]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.sample_count(), 0);
    }
}
