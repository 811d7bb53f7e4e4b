use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrajframeError>;

#[derive(Error, Debug)]
pub enum TrajframeError {
    #[error("IO error {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse error {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("geodesy error {0}")]
    Geodesy(#[from] geodesy::prelude::Error),

    #[error("unsupported EPSG code {0}")]
    UnsupportedEpsg(u32),

    #[error("trajectory has no coordinate reference system")]
    MissingCrs,

    #[error("trajectory has no '{0}' column")]
    MissingField(&'static str),

    #[error("malformed header line '{0}'")]
    MalformedHeader(String),

    #[error("malformed value '{value}' in row {row}")]
    MalformedValue { row: usize, value: String },

    #[error("trajectory contains no positions")]
    EmptyTrajectory,

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(f64),

    #[error("transformation matrix is not invertible")]
    SingularMatrix,

    #[error("grid file not found: {}", .0.display())]
    GridNotFound(PathBuf),

    #[error("{count} positions lie outside grid {}", .grid.display())]
    OutsideGrid { grid: PathBuf, count: usize },

    #[error("'{definition}' failed for {count} positions")]
    ProjectionFailed { definition: String, count: usize },

    #[error("expected {expected} positions, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub fn malformed_value(row: usize, value: impl ToString) -> TrajframeError {
    TrajframeError::MalformedValue {
        row,
        value: value.to_string(),
    }
}
