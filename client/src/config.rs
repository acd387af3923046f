//! Client settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `SHOWCASE_*` environment variables over an
//! optional configuration file. Call [`ClientSettings::session_policy`] to
//! validate them and obtain the policy the services consume.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::SessionPolicy;
use crate::domain::ports::ExpirySlot;
use crate::outbound::{FileExpirySlot, MemoryExpirySlot};

/// Reasons a settings layer is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("session_ttl_hours must be at least 1")]
    ZeroSessionTtl,
    #[error("session_ttl_hours {hours} is out of range")]
    SessionTtlOutOfRange { hours: u32 },
    #[error("profile_fetch_attempts must be at least 1")]
    ZeroProfileFetchAttempts,
    #[error("max_upload_bytes must be at least 1")]
    ZeroUploadLimit,
}

/// Settings controlling session lifetime, uploads and expiry persistence.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHOWCASE")]
pub struct ClientSettings {
    /// Hours a fresh session stays valid.
    #[ortho_config(default = 24)]
    pub session_ttl_hours: u32,
    /// Largest accepted upload in bytes.
    #[ortho_config(default = 2_097_152)]
    pub max_upload_bytes: usize,
    /// Profile reads attempted before a signed-in user is demoted.
    #[ortho_config(default = 2)]
    pub profile_fetch_attempts: u32,
    /// File holding the session expiry; in memory when unset.
    pub expiry_path: Option<PathBuf>,
}

impl ClientSettings {
    /// Reject values no session could run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.session_ttl_hours == 0 {
            return Err(SettingsError::ZeroSessionTtl);
        }
        if self.profile_fetch_attempts == 0 {
            return Err(SettingsError::ZeroProfileFetchAttempts);
        }
        if self.max_upload_bytes == 0 {
            return Err(SettingsError::ZeroUploadLimit);
        }
        Ok(())
    }

    /// Validate and convert into the policy consumed by the services.
    pub fn session_policy(&self) -> Result<SessionPolicy, SettingsError> {
        self.validate()?;
        let ttl = TimeDelta::try_hours(i64::from(self.session_ttl_hours)).ok_or(
            SettingsError::SessionTtlOutOfRange {
                hours: self.session_ttl_hours,
            },
        )?;
        Ok(SessionPolicy::new(
            ttl,
            self.profile_fetch_attempts,
            self.max_upload_bytes,
        ))
    }

    /// Expiry slot selected by `expiry_path`.
    pub fn expiry_slot(&self) -> Arc<dyn ExpirySlot> {
        match &self.expiry_path {
            Some(path) => Arc::new(FileExpirySlot::new(path.clone())),
            None => Arc::new(MemoryExpirySlot::new()),
        }
    }
}
