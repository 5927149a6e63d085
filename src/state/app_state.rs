use serde::{Deserialize, Serialize};

use crate::config::PlotSettings;
use crate::error::Result;
use crate::state::figure_state::FigureState;
use crate::state::marginal_series::{color_for_index, MarginalSeries, COLOR_CYCLE};
use crate::state::theme::Theme;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    pub figures: Vec<FigureState>,
    pub theme: Theme,
    #[serde(default)]
    pub settings: PlotSettings,
}

impl AppState {
    pub fn new(settings: PlotSettings) -> Self {
        Self {
            figures: Vec::new(),
            theme: Theme::default(),
            settings,
        }
    }

    /// Plot one parameter's marginal.
    ///
    /// With `create_new_figure` a fresh single figure is opened, otherwise the
    /// marginal is overlaid onto the last panel of the most recent figure.
    pub fn plot_marginal(
        &mut self,
        values: Vec<f64>,
        name: &str,
        create_new_figure: bool,
        color: Option<[u8; 4]>,
    ) -> Result<u64> {
        let color = color.unwrap_or(self.settings.color);
        let mut series = MarginalSeries::new(name.to_string(), values, color);
        series.marginal(self.settings.bins)?;

        match self.figures.last_mut() {
            Some(figure) if !create_new_figure => {
                figure.overlay(series);
                Ok(figure.id)
            }
            _ => {
                let figure = FigureState::single(series);
                let id = figure.id;
                self.figures.push(figure);
                Ok(id)
            }
        }
    }

    /// Plot a grid of marginals, one panel per parameter.
    pub fn plot_marginal_grid(
        &mut self,
        params: Vec<(String, Vec<f64>)>,
        ncols: Option<usize>,
        color: Option<[u8; 4]>,
    ) -> Result<u64> {
        let base = color.unwrap_or(self.settings.color);
        let start = COLOR_CYCLE.iter().position(|c| *c == base).unwrap_or(0);
        let mut series = Vec::with_capacity(params.len());
        for (i, (name, values)) in params.into_iter().enumerate() {
            let color = if self.settings.cycle_colors {
                color_for_index(start + i)
            } else {
                base
            };
            let mut s = MarginalSeries::new(name, values, color);
            s.marginal(self.settings.bins)?;
            series.push(s);
        }

        let ncols = ncols.unwrap_or(self.settings.ncols);
        let figure = FigureState::grid(series, ncols, self.settings.nrows)?;
        let id = figure.id;
        self.figures.push(figure);
        Ok(id)
    }

    pub fn remove_figure(&mut self, figure_id: u64) {
        self.figures.retain(|f| f.id != figure_id);
    }

    pub fn figure_by_id(&self, id: u64) -> Option<&FigureState> {
        self.figures.iter().find(|f| f.id == id)
    }

    pub fn figure_by_id_mut(&mut self, id: u64) -> Option<&mut FigureState> {
        self.figures.iter_mut().find(|f| f.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a saved project. Bin and column counts are clamped to at least one.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut state: Self = serde_json::from_str(json)?;
        state.settings.bins = state.settings.bins.max(1);
        state.settings.ncols = state.settings.ncols.max(1);
        Ok(state)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PlotSettings::default())
    }
}
