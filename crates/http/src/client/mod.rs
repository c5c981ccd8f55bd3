//! Shopfront HTTP client

pub mod auth;
pub mod cart;
pub mod error;
pub mod events;
pub mod orders;
pub mod payments;
pub mod profile;
pub mod request;
pub mod store;

mod refresh;

use error::ClientError;
use events::{AuthEvent, AuthEvents};
use refresh::RefreshCoordinator;
use request::{ApiRequest, NO_CACHE_HEADERS};
use reqwest::{Client, ClientBuilder, StatusCode, header};
use shopfront_core::settings::{ApiSettings, normalize_prefix};
use shopfront_core::{Location, LoggingNavigator, Navigator};
use std::sync::Arc;
use std::time::Duration;
use store::{MemoryTokenStore, TokenKind, TokenStore};

/// Shopfront API client
///
/// Cheap to clone; clones share the token store, navigator, listeners and
/// refresh coordination.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base_url: String,
    path_prefix: String,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    events: AuthEvents,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Path prefix prepended to every endpoint
    pub fn path_prefix(&self) -> &str {
        &self.inner.path_prefix
    }

    /// Shared token store
    pub fn token_store(&self) -> &dyn TokenStore {
        self.inner.store.as_ref()
    }

    /// Session lifecycle notifications
    pub fn events(&self) -> &AuthEvents {
        &self.inner.events
    }

    /// Whether an access token is currently stored
    pub fn has_access_token(&self) -> bool {
        self.inner.store.get(TokenKind::Access).is_some()
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.inner.base_url, self.inner.path_prefix, path)
    }

    /// Build a reqwest request, attaching the bearer token and, for auth
    /// endpoints, the no-cache headers
    fn build_request(&self, request: &ApiRequest, token: Option<&str>) -> reqwest::RequestBuilder {
        let mut builder = self
            .inner
            .client
            .request(request.method().clone(), self.url_for(request.path()));

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        if request.auth_endpoint().is_some() {
            for (name, value) in NO_CACHE_HEADERS {
                builder = builder.header(name, value);
            }
        }

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }

        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        builder
    }

    /// Dispatch once with the given token, mapping non-success statuses to errors
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            authenticated = token.is_some(),
            state = ?request.state(),
            "Dispatching request"
        );

        let response = self.build_request(request, token).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ClientError::from_response(response).await)
        }
    }

    /// Dispatch without the refresh interceptor
    async fn dispatch_once(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let token = self.inner.store.get(TokenKind::Access);
        self.dispatch(request, token.as_deref()).await
    }

    /// Dispatch with one refresh-and-replay on 401
    async fn send_raw(&self, mut request: ApiRequest) -> Result<reqwest::Response, ClientError> {
        loop {
            let token = self.inner.store.get(TokenKind::Access);
            match self.dispatch(&request, token.as_deref()).await {
                Err(err @ ClientError::AuthenticationFailed(_)) if request.may_refresh() => {
                    request.mark_retried();
                    self.inner
                        .refresh
                        .recover(self, token.as_deref(), err)
                        .await?;
                    tracing::debug!(path = request.path(), "Replaying request after refresh");
                }
                other => return other,
            }
        }
    }

    /// Execute a request and decode the JSON response
    pub async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.send_raw(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a request whose response body is irrelevant
    pub async fn send_empty(&self, request: ApiRequest) -> Result<StatusCode, ClientError> {
        let response = self.send_raw(request).await?;
        Ok(response.status())
    }

    /// Tear down the persisted session after an irrecoverable auth failure
    pub(crate) fn end_session(&self) {
        if let Err(err) = self.inner.store.clear() {
            tracing::error!(error = %err, "Failed to clear credentials");
        }
        self.inner.events.emit(AuthEvent::SessionExpired);
        self.inner.navigator.navigate(Location::login());
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("path_prefix", &self.inner.path_prefix)
            .finish_non_exhaustive()
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    path_prefix: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn TokenStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Start from loaded settings
    pub fn from_settings(settings: &ApiSettings) -> Self {
        let builder = Self::default()
            .base_url(&settings.base_url)
            .path_prefix(&settings.path_prefix)
            .user_agent(&settings.user_agent);

        if settings.timeout_secs == 0 {
            builder
        } else {
            builder.timeout(Duration::from_secs(settings.timeout_secs))
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the endpoint path prefix (default `/api`)
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the token store (default: in-memory)
    #[must_use]
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the navigator used for the login redirect (default: log only)
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let path_prefix = normalize_prefix(self.path_prefix.as_deref().unwrap_or("/api"));

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("shopfront-client/", env!("CARGO_PKG_VERSION")).to_string()),
        );

        let client = client_builder.build()?;

        Ok(ApiClient {
            inner: Arc::new(Inner {
                client,
                base_url,
                path_prefix,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
                navigator: self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator)),
                events: AuthEvents::default(),
                refresh: RefreshCoordinator::default(),
            }),
        })
    }
}
