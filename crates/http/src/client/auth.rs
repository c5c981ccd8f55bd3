//! Authentication API client methods

use super::request::{ApiRequest, AuthEndpoint};
use super::{ApiClient, ClientError};
use shopfront_core::types::{RefreshRequest, RefreshResponse};
use shopfront_core::{AuthResponse, LoginRequest, RegisterRequest};

impl ApiClient {
    /// Get the user behind the current access token
    pub async fn current_user(&self) -> Result<AuthResponse, ClientError> {
        self.send(ApiRequest::get(AuthEndpoint::CurrentUser.path()))
            .await
    }

    /// Exchange email and password for a token pair
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let req = ApiRequest::post(AuthEndpoint::Login.path()).json(request)?;
        self.send(req).await
    }

    /// Create an account; the response is the same as for login
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let req = ApiRequest::post(AuthEndpoint::Register.path()).json(request)?;
        self.send(req).await
    }

    /// Invalidate the session server-side
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send_empty(ApiRequest::post(AuthEndpoint::Logout.path()))
            .await
            .map(|_| ())
    }

    /// Trade a refresh token for a new access token
    ///
    /// Dispatched exactly once: a failure here is never itself refreshed.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let req = ApiRequest::post(AuthEndpoint::Refresh.path()).json(&RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })?;
        let response = self.dispatch_once(&req).await?;
        Ok(response.json().await?)
    }
}
