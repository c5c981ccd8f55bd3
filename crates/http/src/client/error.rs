//! Client error types

use super::store::StoreError;
use crate::error::ErrorResponse;
use std::sync::Arc;
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

    /// The server answered successfully but the body is unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Persisted credentials could not be read or written
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    /// The refresh round trip failed; the session has been torn down
    ///
    /// Requests that waited on the same refresh share one inner error.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] Arc<ClientError>),

    /// The session was ended elsewhere (logout, another client) while this
    /// request waited to refresh
    #[error("Session expired")]
    SessionExpired,
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

    /// Consume a non-success response into an error
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let message = match response.text().await {
            Ok(body) => ErrorResponse::extract_message(&body)
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
                .unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Self::from_status(status, message)
    }

    /// Whether the server rejected the caller's credentials
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::SessionExpired)
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }
}
