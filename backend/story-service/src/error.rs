use story_api::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Story API error: {0}")]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The server answered successfully but returned no such resource
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Whether re-triggering the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            Self::Config(_) | Self::Session(_) | Self::Validation(_) | Self::NotFound(_) => false,
        }
    }
}

impl From<story_api::ConfigError> for ServiceError {
    fn from(err: story_api::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl From<envy::Error> for ServiceError {
    fn from(err: envy::Error) -> Self {
        ServiceError::Config(err.to_string())
    }
}

impl From<paging::PagingConfigError> for ServiceError {
    fn from(err: paging::PagingConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_follows_api_error() {
        assert!(ServiceError::Api(ApiError::Timeout("slow".into())).is_retryable());
        assert!(!ServiceError::Api(ApiError::Decode("bad".into())).is_retryable());
        assert!(!ServiceError::Validation("empty".into()).is_retryable());
        assert!(!ServiceError::NotFound("story 1".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ServiceError::from(ApiError::Business("Quota exceeded".into()));
        assert_eq!(err.to_string(), "Story API error: Quota exceeded");
    }
}
