pub mod marginal_plot;
pub mod snapshot;
