//! Navigation guard
//!
//! Every navigation re-verifies the session with the server before deciding,
//! then applies the target route's access rules.

use crate::auth::SessionStore;
use crate::routes;
use shopfront_core::{Location, Navigator};

/// Access rules attached to a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
}

impl RouteMeta {
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            requires_guest: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            requires_guest: false,
        }
    }

    pub const fn guest() -> Self {
        Self {
            requires_auth: false,
            requires_guest: true,
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether a navigation to `full_path` may proceed
pub fn evaluate(meta: RouteMeta, full_path: &str, is_authenticated: bool) -> GuardDecision {
    if meta.requires_guest && is_authenticated {
        return GuardDecision::Redirect(Location::home());
    }

    if meta.requires_auth && !is_authenticated {
        return GuardDecision::Redirect(Location::login_with_redirect(full_path));
    }

    GuardDecision::Allow
}

/// Route guard bound to a session
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Check a navigation to `full_path` against the route table
    pub async fn before_each(&self, full_path: &str) -> GuardDecision {
        self.check(routes::meta_for(full_path), full_path).await
    }

    /// Check a navigation with explicit access rules
    pub async fn check(&self, meta: RouteMeta, full_path: &str) -> GuardDecision {
        let is_authenticated = self.session.check_auth().await;
        let decision = evaluate(meta, full_path, is_authenticated);
        tracing::debug!(path = full_path, is_authenticated, ?decision, "Route guard decision");
        decision
    }

    /// Run the guard and follow any redirect through `navigator`
    ///
    /// Returns whether the original navigation may proceed.
    pub async fn navigate(&self, full_path: &str, navigator: &dyn Navigator) -> bool {
        match self.before_each(full_path).await {
            GuardDecision::Allow => true,
            GuardDecision::Redirect(location) => {
                navigator.navigate(location);
                false
            }
        }
    }
}
