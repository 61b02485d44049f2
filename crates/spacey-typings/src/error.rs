//! Error types for typings resolution.

use thiserror::Error;

use crate::path::PathError;

/// Result type for typings operations.
pub type Result<T> = std::result::Result<T, TypingsError>;

/// A failed network request.
///
/// Cloneable because the fetch cache hands the same outcome to every caller
/// waiting on a URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-2xx status
    #[error("{status_text} ({url})")]
    Status {
        url: String,
        status: u16,
        /// Reason phrase, or the numeric status when the server sent none
        status_text: String,
    },

    /// The request never produced a response
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. } | FetchError::Transport { url, .. } => url,
        }
    }

    /// HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { .. } => None,
        }
    }
}

/// Main error type for typings resolution.
#[derive(Error, Debug)]
pub enum TypingsError {
    /// The registry could not satisfy a version range
    #[error("No version of {package} satisfies {range}")]
    VersionResolution { package: String, range: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    /// The package manifest declares neither `typings` nor `types`
    #[error("No typings field in package.json of {0}")]
    NoTypingsField(String),

    /// The package listing contains no `.d.ts` or `.ts` files
    #[error("No inline typings found in {0}")]
    NoInlineTypings(String),

    /// A response body was not the JSON we expected
    #[error("Malformed JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A path segment was not a string
    #[error(transparent)]
    InvalidArgument(#[from] PathError),

    /// Every typings strategy failed for a package
    #[error("No typings found for {package}: {}", display_attempts(.attempts))]
    StrategiesExhausted {
        package: String,
        attempts: Vec<(&'static str, TypingsError)>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

fn display_attempts(attempts: &[(&'static str, TypingsError)]) -> String {
    attempts
        .iter()
        .map(|(strategy, err)| format!("{}: {}", strategy, err))
        .collect::<Vec<_>>()
        .join("; ")
}
