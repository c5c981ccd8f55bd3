//! Shopfront core types and utilities

pub mod error;
pub mod navigation;
pub mod role;
pub mod settings;
pub mod tracing;
pub mod types;

pub use error::{CoreError, CoreResult, ErrorContext};
pub use navigation::{Location, LoggingNavigator, Navigator};
pub use role::{Role, RoleSet, parse_roles};
pub use settings::{ApiSettings, ClientSettings};
pub use types::{AuthResponse, Credentials, LoginRequest, RegisterRequest, User};
