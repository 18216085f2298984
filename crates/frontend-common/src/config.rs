//! Frontend configuration

use web_sys::window;

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// localStorage key for the raw bearer token
    pub const AUTH_TOKEN_KEY: &'static str = "auth_token";

    /// localStorage key for the serialized user record
    pub const AUTH_USER_KEY: &'static str = "auth_user";

    /// Schema version written alongside the user record
    pub const USER_RECORD_VERSION: u32 = 1;

    /// Shown when a login fails without a server-supplied reason
    pub const LOGIN_FALLBACK_MESSAGE: &'static str = "Error al iniciar sesión";

    /// Rendered in place of the app when no HTTP client can be built
    pub const CLIENT_UNAVAILABLE_MESSAGE: &'static str = "No se pudo conectar con el servidor.";
}

/// Backend base URL baked in at build time, if any
pub const BACKEND_URL_OVERRIDE: Option<&str> = option_env!("PORPAGAR_BACKEND_URL");

/// Resolve the backend base URL
///
/// Uses `PORPAGAR_BACKEND_URL` from the build environment when set, then the
/// page origin, and finally an empty string so requests go to relative URLs.
pub fn backend_url() -> String {
    resolve_backend_url(BACKEND_URL_OVERRIDE, page_origin)
}

fn page_origin() -> Option<String> {
    window().and_then(|w| w.location().origin().ok())
}

fn resolve_backend_url(
    configured: Option<&str>,
    origin: impl FnOnce() -> Option<String>,
) -> String {
    let url = configured
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
        .or_else(origin)
        .unwrap_or_default();

    url.trim_end_matches('/').to_string()
}
