use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::processing::histogram::DEFAULT_BINS;
use crate::state::marginal_series::parse_color;

pub const DEFAULT_GRID_COLUMNS: usize = 3;
pub const DEFAULT_COLOR: &str = "C0";

/// Plot marginal posteriors with shaded credible intervals.
#[derive(Debug, Parser)]
#[command(name = "marginalplot", version, about)]
pub struct Cli {
    /// Trace file to open (CSV, TSV, XLS or XLSX, one column per parameter)
    pub file: Option<PathBuf>,

    /// Parameters to plot, comma separated (default: every numeric column)
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Histogram bins per marginal
    #[arg(short, long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,

    /// Panels per row in grid figures
    #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS)]
    pub ncols: usize,

    /// Fixed number of rows in grid figures (default: as many as needed)
    #[arg(long)]
    pub nrows: Option<usize>,

    /// Fill colour: C0..C9 or #rrggbb
    #[arg(long, default_value = DEFAULT_COLOR)]
    pub color: String,

    /// Open the selected parameters as one grid figure instead of separate figures
    #[arg(short, long)]
    pub grid: bool,

    /// Print credible intervals and exit without opening a window
    #[arg(short, long, requires = "file")]
    pub summary: bool,

    /// With --summary, print JSON instead of CSV
    #[arg(long, requires = "summary")]
    pub json: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Rendering settings shared by every figure; saved with the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub bins: usize,
    pub ncols: usize,
    /// Fixed grid height; `None` fits the rows to the panel count.
    pub nrows: Option<usize>,
    /// Default fill colour for new series.
    pub color: [u8; 4],
    /// Give each panel of a grid the next colour of the cycle.
    pub cycle_colors: bool,
    pub show_legend: bool,
    /// Size of one marginal panel in points.
    pub panel_size: [f32; 2],
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            ncols: DEFAULT_GRID_COLUMNS,
            nrows: None,
            color: crate::state::marginal_series::COLOR_CYCLE[0],
            cycle_colors: false,
            show_legend: true,
            panel_size: [400.0, 300.0],
        }
    }
}

impl PlotSettings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            bins: cli.bins.max(1),
            ncols: cli.ncols.max(1),
            nrows: cli.nrows,
            color: parse_color(&cli.color)?,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["marginalplot"]);
        assert_eq!(cli.bins, 100);
        assert_eq!(cli.ncols, 3);
        assert_eq!(cli.color, "C0");
        assert_eq!(cli.nrows, None);
        assert!(cli.file.is_none());
        assert!(!cli.summary);
    }

    #[test]
    fn test_cli_columns_split_on_commas() {
        let cli = Cli::parse_from(["marginalplot", "trace.csv", "-c", "mu,tau", "--grid"]);
        assert_eq!(cli.columns, vec!["mu", "tau"]);
        assert!(cli.grid);
    }

    #[test]
    fn test_summary_requires_file() {
        assert!(Cli::try_parse_from(["marginalplot", "--summary"]).is_err());
        assert!(Cli::try_parse_from(["marginalplot", "t.csv", "--summary", "--json"]).is_ok());
    }

    #[test]
    fn test_settings_from_cli() {
        let cli = Cli::parse_from(["marginalplot", "--bins", "0", "--color", "C1"]);
        let s = PlotSettings::from_cli(&cli).unwrap();
        assert_eq!(s.bins, 1);
        assert_eq!(s.color, crate::state::marginal_series::COLOR_CYCLE[1]);

        let shaped = Cli::parse_from(["marginalplot", "--nrows", "2", "--ncols", "4"]);
        assert_eq!(PlotSettings::from_cli(&shaped).unwrap().nrows, Some(2));

        let bad = Cli::parse_from(["marginalplot", "--color", "teal"]);
        assert!(PlotSettings::from_cli(&bad).is_err());
    }

    #[test]
    fn test_settings_missing_fields_default() {
        let s: PlotSettings = serde_json::from_str(r#"{"bins": 40}"#).unwrap();
        assert_eq!(s.bins, 40);
        assert!(s.show_legend);
    }
}
