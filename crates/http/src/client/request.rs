//! Outstanding request description
//!
//! Requests are kept as plain data rather than `reqwest::RequestBuilder` so
//! they can be rebuilt with a fresh `Authorization` header and replayed after
//! a token refresh.

use super::ClientError;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Headers that stop intermediate caches from storing auth responses
pub const NO_CACHE_HEADERS: [(&str, &str); 3] = [
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

/// Authentication endpoints, relative to the configured path prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEndpoint {
    Login,
    Register,
    Refresh,
    Logout,
    CurrentUser,
}

impl AuthEndpoint {
    pub const ALL: [Self; 5] = [
        Self::Login,
        Self::Register,
        Self::Refresh,
        Self::Logout,
        Self::CurrentUser,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/auth/login",
            Self::Register => "/auth/register",
            Self::Refresh => "/auth/refresh",
            Self::Logout => "/auth/logout",
            Self::CurrentUser => "/auth/me",
        }
    }

    /// Match a request path (query string ignored)
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }

    /// Endpoints that present credentials themselves: a 401 there means the
    /// credentials are wrong, not that the access token expired.
    pub const fn bypasses_refresh(self) -> bool {
        matches!(self, Self::Login | Self::Register | Self::Refresh)
    }
}

/// Whether a request has already been replayed after a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryState {
    #[default]
    Initial,
    Retried,
}

/// A request that can be dispatched more than once
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    query: Vec<(String, String)>,
    state: RetryState,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
            state: RetryState::Initial,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Fails if the body cannot be represented as JSON
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub const fn state(&self) -> RetryState {
        self.state
    }

    pub fn auth_endpoint(&self) -> Option<AuthEndpoint> {
        AuthEndpoint::from_path(&self.path)
    }

    /// Whether a 401 on this request may trigger a refresh and replay
    pub fn may_refresh(&self) -> bool {
        self.state == RetryState::Initial
            && !self.auth_endpoint().is_some_and(AuthEndpoint::bypasses_refresh)
    }

    pub(crate) fn mark_retried(&mut self) {
        self.state = RetryState::Retried;
    }
}
