//! State shared by Shopfront frontends
//!
//! Host-agnostic: a browser shell, a desktop shell or the CLI drive the same
//! session store, cart mirror and route guard over one [`ApiClient`].
//!
//! [`ApiClient`]: shopfront_http::ApiClient

pub mod auth;
pub mod cart;
pub mod context;
pub mod guard;
pub mod routes;

pub use auth::{Session, SessionStore};
pub use cart::{CartState, CartStore};
pub use context::AppContext;
pub use guard::{GuardDecision, RouteGuard, RouteMeta, evaluate};
pub use routes::{ROUTES, Route, find_route};
