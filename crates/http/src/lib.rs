//! Shopfront HTTP client
//!
//! A single shared [`ApiClient`] dispatches every call to the Shopfront API.
//! It attaches the stored bearer token, marks authentication endpoints as
//! uncacheable and, when a request is rejected with 401, refreshes the access
//! token once and replays the request.

pub mod client;
pub mod error;

pub use client::error::ClientError;
pub use client::events::{AuthEvent, AuthEvents, Subscription};
pub use client::orders::OrdersQuery;
pub use client::request::{ApiRequest, AuthEndpoint, RetryState};
pub use client::store::{FileTokenStore, MemoryTokenStore, StoreError, TokenKind, TokenStore};
pub use client::{ApiClient, ApiClientBuilder};
pub use error::ErrorResponse;
