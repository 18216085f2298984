//! Shared frontend pieces for porpagar: the session manager, the storage it
//! persists into, and the Yew context that scopes it over a component tree.

pub mod auth;
pub mod config;
pub mod hooks;
pub mod logging;
pub mod storage;

pub use auth::{
    LoginError, Role, SessionHandle, SessionManager, SessionProvider, UsageError, User,
    try_use_session, use_session,
};
pub use config::{AuthConfig, backend_url};
pub use hooks::{use_login_callback, use_logout_callback};
pub use logging::init_logging;
pub use storage::{BrowserStorage, KeyValueStore, MemoryStorage, SharedStore};
