//! Session record and its persisted form

use crate::config::AuthConfig;
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse permission tag carried on the user record
///
/// Unknown values from the server are kept verbatim in `Other` and grant
/// neither admin nor read-only semantics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    ReadOnly,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::ReadOnly => "readonly",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "admin" => Self::Admin,
            "readonly" => Self::ReadOnly,
            _ => Self::Other(role),
        }
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::from(role.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
}

/// Token and identity; one never exists without the other
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Why a persisted session could not be restored
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("only one of the session entries is present")]
    Partial,

    #[error("stored token is empty")]
    EmptyToken,

    #[error("stored user record is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("stored user record has unsupported version {0}")]
    UnsupportedVersion(u32),

    #[error("stored user record has an empty username")]
    EmptyUsername,
}

/// On-disk shape of `auth_user`
#[derive(Debug, Serialize, Deserialize)]
struct PersistedUser {
    // Records written before the field existed are version 1
    #[serde(default = "legacy_version")]
    version: u32,
    username: String,
    role: Role,
}

const fn legacy_version() -> u32 {
    1
}

impl From<&User> for PersistedUser {
    fn from(user: &User) -> Self {
        Self {
            version: AuthConfig::USER_RECORD_VERSION,
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }
}

fn decode_user(raw: &str) -> Result<User, RestoreError> {
    let record: PersistedUser = serde_json::from_str(raw)?;
    if record.version != AuthConfig::USER_RECORD_VERSION {
        return Err(RestoreError::UnsupportedVersion(record.version));
    }
    if record.username.is_empty() {
        return Err(RestoreError::EmptyUsername);
    }
    Ok(User {
        username: record.username,
        role: record.role,
    })
}

fn read_session(store: &dyn KeyValueStore) -> Result<Option<Session>, RestoreError> {
    let token = store.get(AuthConfig::AUTH_TOKEN_KEY);
    let user = store.get(AuthConfig::AUTH_USER_KEY);

    match (token, user) {
        (None, None) => Ok(None),
        (Some(token), Some(user)) => {
            if token.is_empty() {
                return Err(RestoreError::EmptyToken);
            }
            let user = decode_user(&user)?;
            Ok(Some(Session { token, user }))
        }
        _ => Err(RestoreError::Partial),
    }
}

/// Read the persisted session
///
/// Anything short of a complete, valid pair counts as logged out, and the
/// leftovers are purged so a later read cannot half-restore them.
pub fn load_session(store: &dyn KeyValueStore) -> Option<Session> {
    match read_session(store) {
        Ok(session) => session,
        Err(error) => {
            tracing::warn!(%error, "discarding persisted session");
            clear_session(store);
            None
        }
    }
}

/// Persist both session entries
pub fn save_session(store: &dyn KeyValueStore, session: &Session) {
    match serde_json::to_string(&PersistedUser::from(&session.user)) {
        Ok(user) => {
            store.set(AuthConfig::AUTH_TOKEN_KEY, &session.token);
            store.set(AuthConfig::AUTH_USER_KEY, &user);
        }
        Err(error) => tracing::error!(%error, "failed to serialize user record"),
    }
}

/// Delete both session entries
pub fn clear_session(store: &dyn KeyValueStore) {
    store.remove(AuthConfig::AUTH_TOKEN_KEY);
    store.remove(AuthConfig::AUTH_USER_KEY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn alice() -> Session {
        Session {
            token: "abc".into(),
            user: User {
                username: "alice".into(),
                role: Role::Admin,
            },
        }
    }

    #[test]
    fn role_parses_known_and_unknown_values() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("readonly"), Role::ReadOnly);
        assert_eq!(Role::from("auditor"), Role::Other("auditor".into()));
        assert_eq!(String::from(Role::Other("auditor".into())), "auditor");
    }

    #[test]
    fn saved_session_loads_back() {
        let store = MemoryStorage::new();
        save_session(&store, &alice());

        assert_eq!(store.get("auth_token").as_deref(), Some("abc"));
        let raw: serde_json::Value =
            serde_json::from_str(&store.get("auth_user").unwrap()).unwrap();
        assert_eq!(raw["username"], "alice");
        assert_eq!(raw["role"], "admin");
        assert_eq!(raw["version"], 1);

        assert_eq!(load_session(&store), Some(alice()));
    }

    #[test]
    fn unversioned_record_is_accepted() {
        let store = MemoryStorage::new();
        store.set("auth_token", "abc");
        store.set("auth_user", r#"{"username":"alice","role":"admin"}"#);

        assert_eq!(load_session(&store), Some(alice()));
    }

    #[test]
    fn partial_session_is_purged() {
        let store = MemoryStorage::new();
        store.set("auth_token", "abc");

        assert_eq!(load_session(&store), None);
        assert!(store.is_empty());
    }

    #[test]
    fn undecodable_user_is_purged() {
        let store = MemoryStorage::new();
        store.set("auth_token", "abc");
        store.set("auth_user", "not json");

        assert_eq!(load_session(&store), None);
        assert!(store.is_empty());
    }

    #[test]
    fn future_schema_version_is_rejected() {
        let store = MemoryStorage::new();
        store.set("auth_token", "abc");
        store.set(
            "auth_user",
            r#"{"version":2,"username":"alice","role":"admin"}"#,
        );

        assert!(matches!(
            read_session(&store),
            Err(RestoreError::UnsupportedVersion(2))
        ));
        assert_eq!(load_session(&store), None);
    }

    #[test]
    fn empty_token_or_username_is_rejected() {
        let store = MemoryStorage::new();
        store.set("auth_token", "");
        store.set("auth_user", r#"{"username":"alice","role":"admin"}"#);
        assert!(matches!(read_session(&store), Err(RestoreError::EmptyToken)));

        store.set("auth_token", "abc");
        store.set("auth_user", r#"{"username":"","role":"admin"}"#);
        assert!(matches!(read_session(&store), Err(RestoreError::EmptyUsername)));
    }

    #[test]
    fn session_debug_hides_token() {
        let rendered = format!("{:?}", alice());
        assert!(!rendered.contains("abc"));
        assert!(rendered.contains("alice"));
    }
}
