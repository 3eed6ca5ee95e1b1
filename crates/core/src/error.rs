//! Error types for Shine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Shine operations.
pub type Result<T> = std::result::Result<T, ShineError>;

/// Main error type for Shine.
#[derive(Debug, Error)]
pub enum ShineError {
    #[error("Script not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
