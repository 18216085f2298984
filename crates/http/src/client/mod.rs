//! Porpagar HTTP client
//!
//! Two client types split public and authenticated endpoints at compile
//! time. The bearer token is attached when a request is built, never stored
//! as a default header on a shared `reqwest::Client`.

pub mod auth;
pub mod error;
pub mod typed;

pub use typed::{AuthenticatedClient, PublicClient, TypedClientBuilder};

use error::ClientError;

/// Path prefix every backend endpoint lives under
pub const API_PREFIX: &str = "/api";

/// User agent sent from native builds
pub(crate) const USER_AGENT: &str = concat!("porpagar-client/", env!("CARGO_PKG_VERSION"));

/// Send a request and decode a JSON body, mapping non-2xx statuses to errors
pub(crate) async fn execute_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        tracing::debug!(status = status.as_u16(), "request rejected by backend");
        Err(ClientError::from_status(status, message))
    }
}

/// Strip trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slashes() {
        assert_eq!(normalize_base_url("https://porpagar.mx//"), "https://porpagar.mx");
        assert_eq!(normalize_base_url(""), "");
    }
}
