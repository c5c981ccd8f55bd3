//! Application context
//!
//! One [`AppContext`] per running frontend: it is the single construction
//! point for the client and the stores built on it, and it owns teardown on
//! logout.

use crate::auth::SessionStore;
use crate::cart::CartStore;
use crate::guard::RouteGuard;
use shopfront_http::ApiClient;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub client: ApiClient,
    pub session: SessionStore,
    pub cart: CartStore,
    pub guard: RouteGuard,
}

impl AppContext {
    pub fn new(client: ApiClient) -> Self {
        let session = SessionStore::new(client.clone());
        let cart = CartStore::new(client.clone());
        let guard = RouteGuard::new(session.clone());
        Self {
            client,
            session,
            cart,
            guard,
        }
    }

    /// Restore the session at startup
    ///
    /// Loads the cart when the stored tokens are still accepted.
    pub async fn start(&self) -> bool {
        let authenticated = self.session.check_auth().await;
        if authenticated {
            if let Err(err) = self.cart.fetch_cart().await {
                tracing::debug!(error = %err, "Cart not loaded at startup");
            }
        }
        authenticated
    }

    /// Sign out and drop every piece of per-user state
    pub async fn logout(&self) {
        self.session.logout().await;
        self.cart.reset();
    }
}
