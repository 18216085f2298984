//! Client error types

use crate::types::ErrorDetail;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// HTTP status the server answered with, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Serialization(_) | Self::Configuration(_) => None,
        }
    }

    /// The `detail` field of a JSON error body, when the server sent one
    pub fn detail(&self) -> Option<String> {
        let body = match self {
            Self::BadRequest(m)
            | Self::AuthenticationFailed(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::ServerError { message: m, .. } => m,
            _ => return None,
        };

        serde_json::from_str::<ErrorDetail>(body)
            .ok()
            .map(|e| e.detail)
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn maps_statuses_to_variants() {
        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, ClientError::AuthenticationFailed(_)));
        assert_eq!(err.status(), Some(401));

        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream".into());
        assert!(matches!(err, ClientError::ServerError { status: 502, .. }));
    }

    #[test]
    fn extracts_detail_from_json_body() {
        let err = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"bad credentials"}"#.into(),
        );
        assert_eq!(err.detail().as_deref(), Some("bad credentials"));
    }

    #[test]
    fn plain_text_body_has_no_detail() {
        let err = ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert_eq!(err.detail(), None);

        let err = ClientError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail":""}"#.into());
        assert_eq!(err.detail(), None);

        let err = ClientError::Configuration("base_url is required".into());
        assert_eq!(err.detail(), None);
    }
}
