//! Error types for labelgate

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a label check run.
///
/// A PR with the wrong labels is not an error; it shows up in the
/// [`Classification`](crate::Classification) instead.
#[derive(Error, Debug)]
pub enum LabelGateError {
    /// Release config could not be read
    #[error("failed to read release config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Release config is not valid YAML or has the wrong shape
    #[error("failed to parse release config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Release config defines no changelog labels at all
    #[error("release config {path} defines no changelog labels")]
    EmptyLabelPool { path: PathBuf },

    /// Repository identifier is not `owner/name`
    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    /// Token cannot be sent as an HTTP header
    #[error("GitHub token contains characters not allowed in an HTTP header")]
    InvalidToken,

    /// Transport failure, timeout, or client construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-2xx status
    #[error("GitHub API error: {status} for {url} - {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Closed-PR listing still reaches past the release after the page limit
    #[error("read {max_pages} pages of closed pull requests without reaching the latest release; raise --max-pages")]
    PageLimitExceeded { max_pages: u32 },

    /// Response body did not match the expected JSON shape
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for labelgate operations
pub type Result<T> = std::result::Result<T, LabelGateError>;
