//! User session persistence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use story_api::Credential;
use tokio::sync::watch;
use tracing::info;

use crate::error::Result;

/// Signed-in user, or the guest session when `is_login` is false
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub email: String,
    pub token: String,
    pub name: String,
    pub is_login: bool,
}

impl UserSession {
    pub fn logged_in(
        email: impl Into<String>,
        token: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
            name: name.into(),
            is_login: true,
        }
    }

    pub fn guest() -> Self {
        Self::default()
    }

    /// Bearer credential for API calls; guest unless logged in
    pub fn credential(&self) -> Credential {
        if self.is_login {
            Credential::bearer(self.token.as_str())
        } else {
            Credential::guest()
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Receiver that always holds the current session
    fn session(&self) -> watch::Receiver<UserSession>;

    async fn save(&self, session: UserSession) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    fn current(&self) -> UserSession {
        self.session().borrow().clone()
    }
}

/// Process-local session store
pub struct InMemorySessionStore {
    sender: watch::Sender<UserSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_session(UserSession::guest())
    }

    pub fn with_session(session: UserSession) -> Self {
        let (sender, _) = watch::channel(session);
        Self { sender }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn session(&self) -> watch::Receiver<UserSession> {
        self.sender.subscribe()
    }

    async fn save(&self, session: UserSession) -> Result<()> {
        info!(email = %session.email, is_login = session.is_login, "session saved");
        self.sender.send_replace(session);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        info!("session cleared");
        self.sender.send_replace(UserSession::guest());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_follows_login_flag() {
        let session = UserSession::logged_in("a@b.com", "token-1", "Ana");
        assert_eq!(session.credential(), Credential::from("token-1"));

        let stale = UserSession {
            is_login: false,
            ..session
        };
        assert!(stale.credential().is_guest());
    }

    #[tokio::test]
    async fn test_store_publishes_changes() {
        let store = InMemorySessionStore::new();
        let mut receiver = store.session();
        assert!(!receiver.borrow().is_login);

        store
            .save(UserSession::logged_in("a@b.com", "token-1", "Ana"))
            .await
            .unwrap();
        receiver.changed().await.unwrap();
        assert!(receiver.borrow().is_login);

        store.clear().await.unwrap();
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), UserSession::guest());
    }
}
