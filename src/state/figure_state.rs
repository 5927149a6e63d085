use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::processing::layout::GridLayout;
use crate::processing::statistics::MarginalSummary;
use crate::state::marginal_series::MarginalSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FigureKind {
    /// One panel; further marginals are overlaid on it.
    Single,
    /// One panel per parameter, `ncols` per row. `nrows` fixes the shape
    /// instead of deriving it from the panel count.
    Grid {
        ncols: usize,
        #[serde(default)]
        nrows: Option<usize>,
    },
}

impl FigureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FigureKind::Single => "Single",
            FigureKind::Grid { .. } => "Grid",
        }
    }
}

/// A single axes: title plus the marginals drawn on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelState {
    pub title: String,
    pub series: Vec<MarginalSeries>,
}

impl PanelState {
    pub fn new(title: String, series: MarginalSeries) -> Self {
        Self {
            title,
            series: vec![series],
        }
    }
}

fn grid_layout(panels: usize, ncols: usize, nrows: Option<usize>) -> Result<GridLayout> {
    match nrows {
        Some(nrows) => GridLayout::with_shape(panels, nrows, ncols),
        None => GridLayout::new(panels, ncols),
    }
}

static NEXT_FIGURE_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

fn next_figure_id() -> u64 {
    NEXT_FIGURE_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureState {
    pub id: u64,
    pub title: String,
    pub kind: FigureKind,
    pub panels: Vec<PanelState>,
    pub show_summary: bool,
    /// Screen rect of the figure (set each frame for screenshot cropping).
    #[serde(skip)]
    pub last_frame_rect: Option<egui::Rect>,
}

impl FigureState {
    fn with_panels(title: String, kind: FigureKind, panels: Vec<PanelState>) -> Self {
        Self {
            id: next_figure_id(),
            title,
            kind,
            panels,
            show_summary: false,
            last_frame_rect: None,
        }
    }

    pub fn single(series: MarginalSeries) -> Self {
        let title = series.label.clone();
        Self::with_panels(title.clone(), FigureKind::Single, vec![PanelState::new(title, series)])
    }

    /// Validates the layout before building one panel per series.
    pub fn grid(series: Vec<MarginalSeries>, ncols: usize, nrows: Option<usize>) -> Result<Self> {
        let layout = grid_layout(series.len(), ncols, nrows)?;
        let title = format!("Marginals ({} parameters)", series.len());
        let panels = series
            .into_iter()
            .map(|s| PanelState::new(s.label.clone(), s))
            .collect();
        Ok(Self::with_panels(
            title,
            FigureKind::Grid {
                ncols: layout.ncols,
                nrows,
            },
            panels,
        ))
    }

    pub fn layout(&self) -> Result<GridLayout> {
        match self.kind {
            FigureKind::Single => GridLayout::new(self.panels.len().max(1), 1),
            FigureKind::Grid { ncols, nrows } => grid_layout(self.panels.len(), ncols, nrows),
        }
    }

    /// Overlay a series onto the last panel.
    pub fn overlay(&mut self, series: MarginalSeries) {
        match self.panels.last_mut() {
            Some(panel) => panel.series.push(series),
            None => self.panels.push(PanelState::new(series.label.clone(), series)),
        }
    }

    pub fn series(&self) -> impl Iterator<Item = &MarginalSeries> {
        self.panels.iter().flat_map(|p| p.series.iter())
    }

    pub fn series_mut(&mut self) -> impl Iterator<Item = &mut MarginalSeries> {
        self.panels.iter_mut().flat_map(|p| p.series.iter_mut())
    }

    pub fn series_count(&self) -> usize {
        self.panels.iter().map(|p| p.series.len()).sum()
    }

    pub fn summaries(&self) -> Vec<MarginalSummary> {
        self.series()
            .filter_map(|s| MarginalSummary::compute(&s.label, &s.values))
            .collect()
    }

    pub fn remove_series_by_id(&mut self, series_id: u64) {
        for panel in &mut self.panels {
            panel.series.retain(|s| s.id != series_id);
        }
        self.panels.retain(|p| !p.series.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::marginal_series::COLOR_CYCLE;

    fn series(name: &str) -> MarginalSeries {
        MarginalSeries::new(name.to_string(), vec![1.0, 2.0, 3.0], COLOR_CYCLE[0])
    }

    #[test]
    fn test_single_figure() {
        let f = FigureState::single(series("mu"));
        assert_eq!(f.title, "mu");
        assert_eq!(f.panels.len(), 1);
        assert_eq!(f.kind, FigureKind::Single);
    }

    #[test]
    fn test_overlay_adds_to_last_panel() {
        let mut f = FigureState::single(series("mu"));
        f.overlay(series("mu_chain2"));
        assert_eq!(f.panels.len(), 1);
        assert_eq!(f.series_count(), 2);
    }

    #[test]
    fn test_grid_figure_layout() {
        let f = FigureState::grid(vec![series("a"), series("b"), series("c"), series("d")], 3, None).unwrap();
        assert_eq!(f.panels.len(), 4);
        let layout = f.layout().unwrap();
        assert_eq!((layout.nrows, layout.ncols), (2, 3));
        assert_eq!(f.panels[3].title, "d");
    }

    #[test]
    fn test_empty_grid_rejected() {
        assert!(FigureState::grid(Vec::new(), 3, None).is_err());
        assert!(FigureState::grid(vec![series("a")], 0, None).is_err());
    }

    #[test]
    fn test_grid_with_fixed_rows() {
        let all = || vec![series("a"), series("b"), series("c"), series("d")];
        let f = FigureState::grid(all(), 3, Some(2)).unwrap();
        let layout = f.layout().unwrap();
        assert_eq!((layout.nrows, layout.ncols), (2, 3));
        assert_eq!(layout.rows().collect::<Vec<_>>(), vec![0..3, 3..4]);

        assert!(matches!(
            FigureState::grid(all(), 1, Some(2)),
            Err(crate::error::MarginalError::GridTooSmall { panels: 4, capacity: 2 })
        ));
    }

    #[test]
    fn test_grid_kind_without_rows_deserializes() {
        let kind: FigureKind = serde_json::from_str(r#"{"Grid":{"ncols":2}}"#).unwrap();
        assert_eq!(kind, FigureKind::Grid { ncols: 2, nrows: None });
    }

    #[test]
    fn test_remove_series_drops_empty_panels() {
        let mut f = FigureState::grid(vec![series("a"), series("b")], 2, None).unwrap();
        let id = f.panels[0].series[0].id;
        f.remove_series_by_id(id);
        assert_eq!(f.panels.len(), 1);
        assert_eq!(f.panels[0].title, "b");
        assert_eq!(f.summaries().len(), 1);
    }
}
