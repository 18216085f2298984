//! Session manager: owns the session, its persisted copy, and login/logout

use super::error_messages::login_error_message;
use super::session::{Role, Session, User, clear_session, load_session, save_session};
use super::state::{SessionAction, SessionState};
use crate::config::AuthConfig;
use crate::storage::{KeyValueStore, SharedStore};
use porpagar_http::types::LoginRequest;
use porpagar_http::{AuthenticatedClient, ClientError, PublicClient};
use thiserror::Error;

/// Why a login attempt failed
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("malformed login response: {0}")]
    MalformedResponse(&'static str),
}

impl LoginError {
    /// Message suitable for showing inline on the login form
    pub fn message(&self) -> String {
        match self {
            Self::Client(error) => login_error_message(error),
            Self::MalformedResponse(_) => AuthConfig::LOGIN_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Verify credentials against the backend without touching any state
///
/// Failures are logged here so every caller gets the same diagnostics.
pub async fn authenticate(
    client: &PublicClient,
    username: &str,
    password: &str,
) -> Result<Session, LoginError> {
    let request = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    };

    let result = match client.login(&request).await {
        Ok(response) if response.access_token.is_empty() => {
            Err(LoginError::MalformedResponse("empty access_token"))
        }
        Ok(response) => Ok(Session {
            token: response.access_token,
            user: User {
                username: response.username,
                role: Role::from(response.role),
            },
        }),
        Err(error) => Err(error.into()),
    };

    match &result {
        Ok(session) => tracing::info!(
            username = %session.user.username,
            role = %session.user.role,
            "login succeeded"
        ),
        Err(error) => tracing::error!(username, %error, "login failed"),
    }

    result
}

/// Read the persisted session into the transition that installs it
pub(crate) fn restore_from(store: &dyn KeyValueStore) -> SessionAction {
    let session = load_session(store);
    if let Some(session) = &session {
        tracing::debug!(username = %session.user.username, "restored persisted session");
    }
    SessionAction::Restored(session)
}

/// Authenticate and persist, yielding the user and the transition to apply
///
/// Storage is written only after the backend accepted the credentials.
pub(crate) async fn login_with(
    client: &PublicClient,
    store: &dyn KeyValueStore,
    username: &str,
    password: &str,
) -> Result<(User, SessionAction), LoginError> {
    let session = authenticate(client, username, password).await?;
    save_session(store, &session);
    let user = session.user.clone();
    Ok((user, SessionAction::LoggedIn(session)))
}

/// Clear storage, yielding the transition to apply
pub(crate) fn logout_from(store: &dyn KeyValueStore, current: Option<&User>) -> SessionAction {
    if let Some(user) = current {
        tracing::info!(username = %user.username, "logging out");
    }
    clear_session(store);
    SessionAction::LoggedOut
}

/// Single owner of the authentication state for one frontend instance
///
/// Built already restored, so `loading` is never observable as true here;
/// mutations happen only through [`login`](Self::login) and
/// [`logout`](Self::logout).
pub struct SessionManager {
    state: SessionState,
    store: SharedStore,
    client: PublicClient,
}

impl SessionManager {
    fn new(store: SharedStore, client: PublicClient) -> Self {
        Self {
            state: SessionState::default(),
            store,
            client,
        }
    }

    /// Create a manager and restore the persisted session
    pub fn restored(store: SharedStore, client: PublicClient) -> Self {
        let mut manager = Self::new(store, client);
        manager.restore();
        manager
    }

    // Only the first call has any effect
    fn restore(&mut self) {
        if !self.state.loading() {
            tracing::debug!("session already restored, ignoring");
            return;
        }
        self.state.apply(restore_from(self.store.as_ref()));
    }

    /// Log in; on failure nothing in memory or in storage changes
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, LoginError> {
        let (user, action) =
            login_with(&self.client, self.store.as_ref(), username, password).await?;
        self.state.apply(action);
        Ok(user)
    }

    /// Drop the session from memory and storage
    pub fn logout(&mut self) {
        let action = logout_from(self.store.as_ref(), self.state.user());
        self.state.apply(action);
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token()
    }

    pub const fn loading(&self) -> bool {
        self.state.loading()
    }

    pub const fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    pub fn is_read_only(&self) -> bool {
        self.state.is_read_only()
    }

    /// Build a request against the backend carrying the current credential
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.state.request(&self.client, method, path)
    }

    /// Typed client for authenticated endpoints, if logged in
    pub fn authenticated_client(&self) -> Option<AuthenticatedClient> {
        self.state.token().map(|token| self.client.authenticate(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::rc::Rc;

    fn persisted_alice() -> MemoryStorage {
        let store = MemoryStorage::new();
        store.set(AuthConfig::AUTH_TOKEN_KEY, "abc");
        store.set(
            AuthConfig::AUTH_USER_KEY,
            r#"{"username":"alice","role":"admin"}"#,
        );
        store
    }

    #[test]
    fn restore_flips_loading_exactly_once() {
        let store = persisted_alice();
        let client = PublicClient::new("http://localhost").unwrap();
        let mut manager = SessionManager::new(Rc::new(store.clone()), client);
        assert!(manager.loading());
        assert!(!manager.is_authenticated());

        manager.restore();
        assert!(!manager.loading());
        assert_eq!(manager.token(), Some("abc"));
        assert!(manager.is_admin());

        // A second restore neither flips loading nor re-reads storage
        manager.logout();
        let replacement: SharedStore = Rc::new(persisted_alice());
        manager.store = replacement;
        manager.restore();
        assert!(!manager.loading());
        assert!(!manager.is_authenticated());
    }

    #[test]
    fn logout_transition_clears_storage() {
        let store = persisted_alice();
        let action = logout_from(&store, None);

        assert!(matches!(action, SessionAction::LoggedOut));
        assert!(store.is_empty());
    }

    #[test]
    fn restore_transition_carries_the_persisted_session() {
        let store = persisted_alice();
        match restore_from(&store) {
            SessionAction::Restored(Some(session)) => {
                assert_eq!(session.token, "abc");
                assert_eq!(session.user.username, "alice");
            }
            other => panic!("unexpected transition {other:?}"),
        }
    }
}
