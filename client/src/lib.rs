//! Session and data-synchronisation core for the project showcase client.
//!
//! The [`domain`] module holds the types, services and state store; ports
//! for everything external live in [`domain::ports`] with adapters under
//! [`outbound`]. [`context::ClientContext`] wires them together.

pub mod config;
pub mod context;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ClientSettings, SettingsError};
pub use context::{ClientContext, ClientPorts};
