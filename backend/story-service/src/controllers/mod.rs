//! UI-facing controllers
//!
//! Controllers hold no UI state; they bind the repository to the current
//! session and are built through [`ControllerFactory`](crate::factory::ControllerFactory).

pub mod auth;
pub mod story;

pub use auth::AuthController;
pub use story::StoryController;
