//! Process-local expiry slot.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::ports::{ExpirySlot, ExpirySlotError};

/// Expiry slot held in memory; lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryExpirySlot(Mutex<Option<DateTime<Utc>>>);

impl MemoryExpirySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slot<T>(
        &self,
        f: impl FnOnce(&mut Option<DateTime<Utc>>) -> T,
    ) -> Result<T, ExpirySlotError> {
        let mut slot = self
            .0
            .lock()
            .map_err(|_| ExpirySlotError::io("expiry slot lock poisoned"))?;
        Ok(f(&mut slot))
    }
}

impl ExpirySlot for MemoryExpirySlot {
    fn load(&self) -> Result<Option<DateTime<Utc>>, ExpirySlotError> {
        self.with_slot(|slot| *slot)
    }

    fn store(&self, expires_at: DateTime<Utc>) -> Result<(), ExpirySlotError> {
        self.with_slot(|slot| *slot = Some(expires_at))
    }

    fn clear(&self) -> Result<(), ExpirySlotError> {
        self.with_slot(|slot| *slot = None)
    }
}
