//! Port for the single locally persisted value: the session expiry instant.
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Errors raised by expiry slot adapters.
    pub enum ExpirySlotError {
        /// Underlying storage could not be read or written.
        Io { message: String } => "expiry slot io failed: {message}",
        /// Stored content could not be decoded.
        Corrupt { message: String } => "expiry slot content is corrupt: {message}",
    }
}

/// Persisted key holding the session expiry.
#[cfg_attr(test, mockall::automock)]
pub trait ExpirySlot: Send + Sync {
    /// Stored expiry, or `None` when nothing is stored.
    fn load(&self) -> Result<Option<DateTime<Utc>>, ExpirySlotError>;

    /// Overwrite the stored expiry.
    fn store(&self, expires_at: DateTime<Utc>) -> Result<(), ExpirySlotError>;

    /// Remove the stored expiry. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), ExpirySlotError>;
}
