/// Bearer credential attached to authenticated requests
use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer token. An empty token is the guest credential.
#[derive(Clone, Default)]
pub struct Credential {
    token: Option<Arc<SecretString>>,
}

impl Credential {
    pub fn guest() -> Self {
        Self { token: None }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        let token: String = token.into();
        if token.trim().is_empty() {
            return Self::guest();
        }
        Self {
            token: Some(Arc::new(SecretString::new(token.into_boxed_str()))),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.token.is_none()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().map(|token| token.expose_secret())
    }

    /// `Authorization` header value, absent for guests
    pub fn authorization_header(&self) -> Option<String> {
        self.bearer_token().map(|token| format!("Bearer {}", token))
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::bearer(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self::bearer(token)
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.bearer_token() == other.bearer_token()
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_guest() {
            f.write_str("Credential(guest)")
        } else {
            f.write_str("Credential(bearer [REDACTED])")
        }
    }
}
