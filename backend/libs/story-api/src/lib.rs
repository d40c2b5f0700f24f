//! Story API client
//!
//! Typed models, errors, and the HTTP client for the remote story service.
//! Consumers depend on the [`StoryApi`] trait so the transport can be swapped
//! for a mock in tests.

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod models;

pub use client::{HttpStoryApi, StoryApi};
pub use config::{ApiConfig, ConfigError};
pub use credential::Credential;
pub use error::{ApiError, ApiResult};

pub use models::{
    ApiEnvelope, LocationFilter, LoginRequest, LoginResponse, LoginResult, MessageResponse,
    NewStory, RegisterRequest, StoriesResponse, Story, StoryDetailResponse, StoryQuery,
};
