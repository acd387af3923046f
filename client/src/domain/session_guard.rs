//! Expiry-checked access to the signed-in identity.
//!
//! Every member-only operation reads the current user through a
//! [`SessionGuard`], so a lapsed session is signed out before any backend
//! call is made on its behalf.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::runtime::Handle;
use tracing::{info, warn};

use super::gateway::RemoteGateway;
use super::ports::ExpirySlot;
use super::state::Transition;
use super::store::StateStore;
use super::user::UserId;

/// Clock handle shared by the services.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Owns the persisted expiry instant and the forced sign-out.
#[derive(Clone)]
pub struct SessionGuard {
    gateway: RemoteGateway,
    store: StateStore,
    expiry: Arc<dyn ExpirySlot>,
    clock: SharedClock,
}

impl SessionGuard {
    pub fn new(
        gateway: RemoteGateway,
        store: StateStore,
        expiry: Arc<dyn ExpirySlot>,
        clock: SharedClock,
    ) -> Self {
        Self {
            gateway,
            store,
            expiry,
            clock,
        }
    }

    /// Signed-in identity after the expiry check, if any.
    pub fn current_user(&self) -> Option<UserId> {
        self.enforce_expiry();
        self.store.select(|state| state.current_user_id().cloned())
    }

    /// Sign out if the stored expiry has passed.
    ///
    /// Returns `true` only for the call that performed the sign-out.
    pub fn enforce_expiry(&self) -> bool {
        let now = self.now();
        match self.load_expiry().filter(|expires_at| *expires_at <= now) {
            Some(expires_at) => {
                self.expire(expires_at);
                true
            }
            None => false,
        }
    }

    /// End the session locally; the backend sign-out runs detached.
    pub fn end_session(&self) {
        self.store.dispatch(Transition::Logout);
        self.clear_expiry();
        self.spawn_backend_sign_out();
        info!("signed out");
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub(crate) fn expire(&self, expires_at: DateTime<Utc>) {
        info!(%expires_at, "session expired; forcing sign-out");
        self.end_session();
    }

    pub(crate) fn persist_expiry(&self, expires_at: DateTime<Utc>) -> DateTime<Utc> {
        if let Err(error) = self.expiry.store(expires_at) {
            warn!(error = %error, "failed to persist session expiry");
        }
        expires_at
    }

    pub(crate) fn load_expiry(&self) -> Option<DateTime<Utc>> {
        match self.expiry.load() {
            Ok(expires_at) => expires_at,
            Err(error) => {
                warn!(error = %error, "ignoring unreadable session expiry");
                None
            }
        }
    }

    pub(crate) fn clear_expiry(&self) {
        if let Err(error) = self.expiry.clear() {
            warn!(error = %error, "failed to clear session expiry");
        }
    }

    fn spawn_backend_sign_out(&self) {
        match Handle::try_current() {
            Ok(handle) => {
                let gateway = self.gateway.clone();
                drop(handle.spawn(async move { gateway.sign_out().await }));
            }
            Err(_) => warn!("no async runtime available; skipping backend sign-out"),
        }
    }
}
