use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarginalError>;

#[derive(Debug, Error)]
pub enum MarginalError {
    #[error("histogram needs at least one bin")]
    ZeroBins,

    #[error("no finite values in sample")]
    EmptySample,

    #[error("no finite values to plot for '{0}'")]
    NoFiniteValues(String),

    #[error("grid needs at least one panel")]
    EmptyGrid,

    #[error("grid needs at least one column")]
    ZeroColumns,

    #[error("{panels} panels do not fit in a grid with {capacity} cells")]
    GridTooSmall { panels: usize, capacity: usize },

    #[error("unknown color '{0}' (expected C0..C9 or #rrggbb)")]
    UnknownColor(String),

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("no data found after header detection")]
    NoData,

    #[error("column '{0}' not found in trace file")]
    ColumnNotFound(String),

    #[error("cannot read workbook: {0}")]
    Workbook(String),

    #[error("trace loading stopped before producing a result")]
    LoadInterrupted,

    #[error("window error: {0}")]
    Window(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
