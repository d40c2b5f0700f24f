use std::sync::Arc;

use story_api::MessageResponse;
use tokio::sync::watch;
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::services::StoryRepository;
use crate::session::{SessionStore, UserSession};

/// Login, registration and logout
pub struct AuthController {
    repository: Arc<StoryRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl AuthController {
    pub fn new(repository: Arc<StoryRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    pub fn session(&self) -> watch::Receiver<UserSession> {
        self.sessions.session()
    }

    /// Log in and persist the resulting session
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "Email and password are required".into(),
            ));
        }

        let result = self.repository.login(email, password).await?;
        let session = UserSession::logged_in(email.trim(), result.token, result.name);
        self.sessions.save(session.clone()).await?;
        info!(user_id = %result.user_id, "user logged in");
        Ok(session)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<MessageResponse> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(ServiceError::Validation("Name and email are required".into()));
        }
        self.repository.register(name, email, password).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await
    }
}
