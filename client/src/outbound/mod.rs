//! Outbound adapters implementing the domain ports.

pub mod expiry;
pub mod memory;
pub mod notifier;

pub use expiry::{FileExpirySlot, MemoryExpirySlot};
pub use memory::{BackendOperation, MemoryBackend};
pub use notifier::TracingNotifier;
