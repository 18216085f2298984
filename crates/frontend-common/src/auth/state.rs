//! In-memory session state and its transitions

use super::session::{Role, Session, User};
use porpagar_http::PublicClient;

/// Current authentication state
///
/// `loading` only covers the window before the persisted session has been
/// read; it flips to false once and never comes back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    session: Option<Session>,
    loading: bool,
}

/// Session state transitions
#[derive(Debug)]
pub enum SessionAction {
    /// Result of reading the persisted session at startup
    Restored(Option<Session>),
    LoggedIn(Session),
    LoggedOut,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            loading: true, // Start with loading to check localStorage
        }
    }
}

impl SessionState {
    /// Apply a transition
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::Restored(session) => {
                if !self.loading {
                    tracing::debug!("session already restored, ignoring");
                    return;
                }
                self.loading = false;
                // A login that finished first is newer than anything on disk
                if self.session.is_none() {
                    self.session = session;
                }
            }
            SessionAction::LoggedIn(session) => {
                self.session = Some(session);
            }
            SessionAction::LoggedOut => {
                self.session = None;
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::Admin)
    }

    pub fn is_read_only(&self) -> bool {
        self.has_role(&Role::ReadOnly)
    }

    fn has_role(&self, role: &Role) -> bool {
        self.user().is_some_and(|u| &u.role == role)
    }

    /// Build a request, attaching the bearer token when a session exists
    pub fn request(
        &self,
        client: &PublicClient,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => client.authenticate(&session.token).request(method, path),
            None => client.request(method, path),
        }
    }
}
