//! Error types for story API calls

use thiserror::Error;

/// Result type alias for story API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The service answered but flagged the request as failed
    #[error("{0}")]
    Business(String),

    /// Connection refused, reset, or otherwise not delivered
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Authenticated-only call attempted without a credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Check if retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Business(_) | Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::Unauthorized(_) | Self::InvalidRequest(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
