use thiserror::Error;

/// Application-wide error types for Harvest.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error (DNS, refused, reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A URL could not be parsed or has no host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A document could not be parsed at all.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A source-declared CSS selector is not valid.
    #[error("Invalid selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true for fetch failures that may succeed on the next sweep.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout")
                    || msg.contains("connect")
                    || msg.contains("reset")
                    || msg.contains("HTTP 5")
                    || msg.contains("HTTP 429")
            }
            _ => false,
        }
    }
}

/// Failure signal returned by a manually triggered scrape.
///
/// Carries only the message of the underlying error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ScrapeFailure {
    pub message: String,
}

impl From<AppError> for ScrapeFailure {
    fn from(err: AppError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
