//! Authenticated session state
//!
//! The [`SessionStore`] owns the in-memory view of who is signed in. It never
//! trusts anything persisted beyond the token pair: the user is populated only
//! from a login/register response or from a server-verified current-user
//! lookup.

use shopfront_core::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
use shopfront_http::{ApiClient, AuthEvent, ClientError, Subscription};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Snapshot of the signed-in state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Session context shared by views and guards
///
/// Cheap to clone; clones observe the same session.
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
    state: Arc<watch::Sender<Session>>,
    _expiry: Arc<Subscription>,
}

impl SessionStore {
    /// Create the store and attach it to the client's session events
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(Session::default());
        let state = Arc::new(state);

        let weak: Weak<watch::Sender<Session>> = Arc::downgrade(&state);
        let expiry = client.events().subscribe(move |event| match event {
            AuthEvent::SessionExpired => {
                if let Some(state) = weak.upgrade() {
                    tracing::info!("Session expired, clearing user");
                    state.send_replace(Session::default());
                }
            }
        });

        Self {
            client,
            state,
            _expiry: Arc::new(expiry),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Watch session changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Verify the stored access token against the server
    ///
    /// Returns whether a session is active afterwards. Any failure tears the
    /// session down instead of surfacing an error.
    pub async fn check_auth(&self) -> bool {
        if !self.client.has_access_token() {
            tracing::debug!("No access token, session is anonymous");
            self.clear_auth_data();
            return false;
        }

        match self.client.current_user().await {
            Ok(response) => {
                let user = response.to_user();
                tracing::debug!(email = %user.email, roles = user.roles.len(), "Session verified");
                self.set_user(user);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "Session verification failed");
                self.clear_auth_data();
                false
            }
        }
    }

    /// Sign in; on failure the previous state is left untouched
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ClientError> {
        let response = self.client.login(request).await?;
        let user = self.set_auth_data(&response)?;
        tracing::info!(email = %user.email, "Logged in");
        Ok(user)
    }

    /// Create an account and sign in with it
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        let response = self.client.register(request).await?;
        let user = self.set_auth_data(&response)?;
        tracing::info!(email = %user.email, "Registered");
        Ok(user)
    }

    /// Sign out; local state is cleared even if the server call fails
    pub async fn logout(&self) {
        if let Err(err) = self.client.logout().await {
            tracing::warn!(error = %err, "Server logout failed, clearing local session anyway");
        }
        self.clear_auth_data();
        tracing::info!("Logged out");
    }

    /// Whether the signed-in user holds `candidate`
    ///
    /// Candidates are trimmed and uppercased first. Names outside the known
    /// role set are reported and never match.
    pub fn has_role(&self, candidate: &str) -> bool {
        match candidate.parse::<Role>() {
            Ok(role) => self
                .state
                .borrow()
                .user
                .as_ref()
                .is_some_and(|user| user.has_role(role)),
            Err(err) => {
                tracing::warn!(candidate, error = %err, "Role check with unknown role");
                false
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin.as_str())
    }

    fn set_auth_data(&self, response: &AuthResponse) -> Result<User, ClientError> {
        let credentials = response.credentials().ok_or_else(|| {
            ClientError::InvalidResponse("authentication response carried no tokens".into())
        })?;
        self.client.token_store().set(&credentials)?;

        let user = response.to_user();
        self.set_user(user.clone());
        Ok(user)
    }

    fn set_user(&self, user: User) {
        self.state.send_replace(Session { user: Some(user) });
    }

    fn clear_auth_data(&self) {
        if let Err(err) = self.client.token_store().clear() {
            tracing::error!(error = %err, "Failed to clear credentials");
        }
        self.state.send_replace(Session::default());
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("client", &self.client)
            .field("session", &*self.state.borrow())
            .finish()
    }
}
