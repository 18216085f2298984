//! User-facing login error messages

use crate::config::AuthConfig;
use porpagar_http::ClientError;

/// Message to show next to the login form
///
/// The server's `detail` is already written for end users; anything else
/// (transport failures, bodies we cannot read) gets the generic fallback.
pub fn login_error_message(error: &ClientError) -> String {
    error
        .detail()
        .unwrap_or_else(|| AuthConfig::LOGIN_FALLBACK_MESSAGE.to_string())
}
