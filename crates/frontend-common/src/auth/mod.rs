//! Authentication module

pub mod context;
pub mod error_messages;
pub mod manager;
pub mod session;
pub mod state;

// Re-export commonly used items
pub use context::{
    ClientUnavailable, SessionHandle, SessionProvider, UsageError, try_use_session,
    use_is_authenticated, use_session, use_user,
};
pub use manager::{LoginError, SessionManager, authenticate};
pub use session::{RestoreError, Role, Session, User};
pub use state::{SessionAction, SessionState};
