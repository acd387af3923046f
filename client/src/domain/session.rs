//! Authenticated session record and the policy governing its lifetime.
//!
//! The session is advisory: the backend keeps its own credential, and the
//! client forces a sign-out once the locally recorded expiry has passed.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::asset::MAX_UPLOAD_BYTES;
use super::user::UserId;

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24;
/// Default number of profile reads before a fetch is treated as failed.
pub const DEFAULT_PROFILE_FETCH_ATTEMPTS: u32 = 2;

/// Identity and expiry of the current session.
///
/// ## Invariants
/// - A session whose `expires_at` is not in the future is invalid and is
///   discarded on the next observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Option<UserId>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session with no identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for `user_id` valid until `expires_at`.
    pub fn authenticated(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id),
            expires_at: Some(expires_at),
        }
    }

    /// Whether the recorded expiry is at or before `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, Utc};
    /// use client::domain::{Session, UserId};
    ///
    /// let now = Utc::now();
    /// let session = Session::authenticated(UserId::new("u1").unwrap(), now);
    /// assert!(session.is_expired_at(now));
    /// assert!(!session.is_expired_at(now - TimeDelta::milliseconds(1)));
    /// ```
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    /// Reported by the observation that forced the sign-out.
    Expired,
}

/// Tunables shared by the session, profile and publishing services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    ttl: TimeDelta,
    profile_fetch_attempts: u32,
    max_upload_bytes: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::hours(i64::from(DEFAULT_SESSION_TTL_HOURS)),
            profile_fetch_attempts: DEFAULT_PROFILE_FETCH_ATTEMPTS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl SessionPolicy {
    /// Build a policy; zero attempts are raised to one.
    pub fn new(ttl: TimeDelta, profile_fetch_attempts: u32, max_upload_bytes: usize) -> Self {
        Self {
            ttl,
            profile_fetch_attempts: profile_fetch_attempts.max(1),
            max_upload_bytes,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn profile_fetch_attempts(&self) -> u32 {
        self.profile_fetch_attempts
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Expiry instant for a session starting at `now`.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.ttl
    }
}
