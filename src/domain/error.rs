use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("input file {} not found", .0.display())]
    MissingInput(PathBuf),

    #[error("dataset '{dataset}' has {found} value(s) but the header lists {expected} frequencies")]
    ShapeMismatch {
        dataset: String,
        expected: usize,
        found: usize,
    },

    #[error("frequency {frequency} Hz is outside the weighting range [{min}, {max}] Hz")]
    OutOfRange { frequency: f64, min: f64, max: f64 },

    #[error("no rows to aggregate for the {frequency} Hz column")]
    EmptyDataset { frequency: f64 },

    #[error("{} contains no measurements", .0.display())]
    EmptyTable(PathBuf),

    #[error("line {line}, column {column}: cannot parse '{value}' as a number")]
    Parse {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("invalid weighting table: {0}")]
    InvalidTable(String),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart rendering failed: {0}")]
    Plot(String),
}
