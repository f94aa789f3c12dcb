/// Error types for the APM loaders
use thiserror::Error;

/// Main error type for loading and shaping input data
#[derive(Error, Debug)]
pub enum LoadError {
    /// Reading an input file failed
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A required column is absent from the header row
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Date parsing failed
    #[error("Row {row}: invalid date {value:?} (expected DD/MM/YYYY)")]
    InvalidDate { row: usize, value: String },

    /// A numeric column held something that is not a number
    #[error("Row {row}: column {column} has non-numeric value {value:?}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    /// A metric column was requested that the table does not carry
    #[error("Unknown metric column: {0}")]
    UnknownColumn(String),
}

/// Type alias for Results using LoadError
pub type Result<T> = std::result::Result<T, LoadError>;
