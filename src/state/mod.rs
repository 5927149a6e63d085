pub mod app_state;
pub mod figure_state;
pub mod marginal_series;
pub mod theme;
