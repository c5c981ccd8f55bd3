//! Shared tracing setup for Shopfront binaries
//!
//! Library code only emits events through the `tracing` macros; installing
//! a subscriber is left to the host, which can use [`init::init_tracing`].

pub mod config;
#[cfg(feature = "tracing")]
pub mod init;

pub use config::InstrumentationConfig;
#[cfg(feature = "tracing")]
pub use init::init_tracing;
