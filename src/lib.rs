//! Posterior marginal plots with shaded credible intervals.
//!
//! A trace (one column per model parameter, one row per draw) is binned into
//! normalized histograms whose 1σ and 2σ percentile bands are shaded, either
//! one figure per parameter or as a grid of panels.

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod processing;
pub mod render;
pub mod state;
pub mod ui;

pub use error::{MarginalError, Result};
pub use processing::marginal::Marginal;
pub use state::app_state::AppState;
