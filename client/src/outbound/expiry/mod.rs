//! Adapters for the persisted session-expiry slot.

mod file;
mod memory;

pub use file::FileExpirySlot;
pub use memory::MemoryExpirySlot;
