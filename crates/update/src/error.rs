//! Update error types.

use thiserror::Error;

/// Error type for update operations.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// The manifest could not be fetched.
    #[error("Failed to fetch manifest: {0}")]
    ManifestFetch(String),

    /// The manifest body was not valid JSON.
    #[error("Malformed manifest: {0}")]
    ManifestParse(String),

    /// The manifest has no artifact key for this platform family.
    #[error("No artifact for platform '{0}'")]
    NoArtifactForPlatform(String),

    /// A download request could not be sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a terminal non-200 status.
    #[error("Download failed with HTTP {0}")]
    Http(u16),

    /// A redirect response carried no usable Location header.
    #[error("Redirect without a Location header")]
    BadRedirect,

    /// The redirect budget ran out.
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(u32),

    /// The body stream failed mid-transfer.
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// No bytes arrived within the inactivity bound.
    #[error("Download timed out after {0}s of inactivity")]
    Timeout(u64),

    /// The completed download was zero bytes.
    #[error("Downloaded artifact is empty")]
    EmptyArtifact,

    /// A URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
