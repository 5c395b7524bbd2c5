//! Session state - who is logged in on this client.

use crate::error::{CoreError, CoreResult};

/// The single login session of an interactive client.
///
/// Empty username means nobody is logged in. There is no logout: the
/// username is only ever replaced by a later register or login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: String,
}

impl Session {
    /// Create an unauthenticated session
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful register or login. Last call wins.
    pub fn authenticate(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// Current username, empty when unauthenticated
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_authenticated(&self) -> bool {
        !self.username.is_empty()
    }

    /// Gate for operations that need a logged-in user
    pub fn require_login(&self) -> CoreResult<&str> {
        if self.is_authenticated() {
            Ok(&self.username)
        } else {
            Err(CoreError::NotLoggedIn)
        }
    }
}
