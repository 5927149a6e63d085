pub mod credible;
pub mod export;
pub mod histogram;
pub mod layout;
pub mod marginal;
pub mod percentile;
pub mod statistics;
