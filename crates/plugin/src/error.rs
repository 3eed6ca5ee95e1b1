//! Plugin error types.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Failed to load a plugin descriptor.
    #[error("Failed to load plugin from {path}: {reason}")]
    LoadError { path: PathBuf, reason: String },

    /// Descriptor did not validate.
    #[error("Invalid plugin descriptor: {0}")]
    InvalidDescriptor(String),

    /// The init hook failed.
    #[error("Plugin init failed: {0}")]
    InitError(String),

    /// None of the candidate programs could be found.
    #[error("No toolchain found; tried: {0}")]
    ToolchainNotFound(String),

    /// The COMPILE stage exited non-zero; RUN was not attempted.
    #[error("Compile failed with exit code {code}: {stderr}")]
    CompileFailed { code: i32, stderr: String },

    /// The RUN stage exited non-zero.
    #[error("Program exited with code {0}")]
    RunFailed(i32),

    /// Plugin execution error.
    #[error("Plugin execution error: {0}")]
    ExecutionError(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
