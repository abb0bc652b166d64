use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::session::Session;

/// Source of truth for who may use the prediction panels.
pub trait CredentialProvider: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single username/password pair taken from configuration.
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&AuthConfig> for StaticCredentials {
    fn from(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl CredentialProvider for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

pub struct AccessGate {
    provider: Arc<dyn CredentialProvider>,
}

impl AccessGate {
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self { provider }
    }

    /// Marks the session logged in when the credentials check out. A failed
    /// attempt leaves the session untouched.
    pub fn login(&self, session: &mut Session, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        if !self.provider.verify(username, password) {
            warn!("Rejected login attempt for user {:?}", username);
            return false;
        }

        session.logged_in = true;
        session.username = Some(username.to_string());
        info!("User {} logged in", username);
        true
    }

    pub fn logout(&self, session: &mut Session) {
        session.logged_in = false;
        session.username = None;
    }
}
