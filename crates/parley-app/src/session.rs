//! Session identity and token.

use parley_core::{Token, User};

use crate::SessionCredentials;

/// Holds the current session, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    credentials: Option<SessionCredentials>,
}

impl SessionStore {
    /// Create a store with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Current credentials.
    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.credentials.as_ref()
    }

    /// Signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    /// Session token.
    pub fn token(&self) -> Option<&Token> {
        self.credentials.as_ref().map(|c| &c.token)
    }

    /// Replace the session.
    pub fn establish(&mut self, credentials: SessionCredentials) {
        self.credentials = Some(credentials);
    }

    /// Drop the session. Returns `true` if there was one.
    pub fn clear(&mut self) -> bool {
        self.credentials.take().is_some()
    }
}
