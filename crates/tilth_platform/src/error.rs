//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Reading or writing the backing store failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store holds data that is not a string map
    #[error("Storage data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage refused the write (quota, private mode, read-only store)
    #[error("Storage not available: {0}")]
    Unavailable(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
