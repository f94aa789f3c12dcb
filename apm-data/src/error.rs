/// Error types for the metric transforms
use apm_core::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    /// Rolling windows must hold at least one row
    #[error("Invalid workload windows (acute: {acute}, chronic: {chronic}); both must be at least 1")]
    InvalidWindow { acute: usize, chronic: usize },

    /// A bar cannot be split into zero segments
    #[error("Invalid segment count: max_segments must be at least 1")]
    InvalidSegmentCount,

    /// Looking up the input column failed
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Type alias for Results using TransformError
pub type Result<T> = std::result::Result<T, TransformError>;
