//! Story feed service
//!
//! Binds the story HTTP API to the generic pager: a paged, refreshable story
//! feed per session credential, plus story details, map stories, uploads and
//! account operations.

pub mod config;
pub mod controllers;
pub mod error;
pub mod factory;
pub mod services;
pub mod session;

pub use config::Config;
pub use controllers::{AuthController, StoryController};
pub use error::{Result, ServiceError};
pub use factory::{ControllerFactory, FromFactory};
pub use services::{StoryPagingSource, StoryRepository, FEED_PAGE_SIZE};
pub use session::{InMemorySessionStore, SessionStore, UserSession};
