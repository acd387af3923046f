//! Session manager: sign-up, sign-in, sign-out and advisory expiry.
//!
//! The manager drives the user slice of the store through the sign-in,
//! sign-up and profile-fetch lifecycles and keeps the expiry instant in the
//! persisted [`ExpirySlot`]. Expiry is checked whenever the session is
//! observed, never by a timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::auth::{LoginCredentials, SignUpRequest};
use super::error::Error;
use super::gateway::RemoteGateway;
use super::identity_subscription::IdentitySubscription;
use super::ports::{ExpirySlot, Notice, Notifier};
use super::session::{Session, SessionPhase, SessionPolicy};
use super::session_guard::{SessionGuard, SharedClock};
use super::state::{Lifecycle, Transition};
use super::store::StateStore;
use super::user::{EmailAddress, UserId, UserProfile};

pub const REGISTERED_NOTICE: &str = "Your registration was successful!";
pub const LOGGED_IN_NOTICE: &str = "Logged in successfully";
pub const ENTER_EMAIL_NOTICE: &str = "Please enter an email";
pub const RESET_SENT_NOTICE: &str = "Password reset link sent to your email";

/// Owns the authenticated-identity lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    gateway: RemoteGateway,
    store: StateStore,
    guard: SessionGuard,
    notifier: Arc<dyn Notifier>,
    policy: SessionPolicy,
    authenticating: Arc<AtomicUsize>,
}

/// Marks an interactive sign-in or sign-up as running until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionManager {
    pub fn new(
        gateway: RemoteGateway,
        store: StateStore,
        expiry: Arc<dyn ExpirySlot>,
        notifier: Arc<dyn Notifier>,
        clock: SharedClock,
        policy: SessionPolicy,
    ) -> Self {
        let guard = SessionGuard::new(gateway.clone(), store.clone(), expiry, clock);
        Self {
            gateway,
            store,
            guard,
            notifier,
            policy,
            authenticating: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Expiry-checked identity access shared with the member-only services.
    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    /// Register an account, write its initial profile and start a session.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserProfile, Error> {
        let request = SignUpRequest::try_from_parts(name, email, password, confirm_password)
            .map_err(|err| self.reject_form(err.into()))?;
        let _in_flight = InFlight::enter(&self.authenticating);
        self.store.dispatch(Transition::SignUp(Lifecycle::Pending));

        let credentials = request.credentials();
        let user_id = match self.gateway.create_identity(credentials).await {
            Ok(user_id) => user_id,
            Err(err) => return Err(self.reject(Transition::SignUp, err.into())),
        };
        let profile = UserProfile::new(
            user_id.clone(),
            request.name().as_ref(),
            credentials.email().as_ref(),
        );
        if let Err(err) = self.gateway.write_profile(&profile).await {
            return Err(self.reject(Transition::SignUp, err.into()));
        }

        self.record_session(&user_id);
        self.store
            .dispatch(Transition::SignUp(Lifecycle::Fulfilled(profile.clone())));
        self.notifier.notify(Notice::success(REGISTERED_NOTICE));
        info!(user_id = %user_id, "account registered");
        Ok(profile)
    }

    /// Authenticate and load the stored profile.
    ///
    /// The user slice holds at least the email as soon as authentication
    /// succeeds; the full profile follows once it has been read.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, Error> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|err| self.reject_form(err.into()))?;
        let _in_flight = InFlight::enter(&self.authenticating);
        self.store.dispatch(Transition::SignIn(Lifecycle::Pending));

        let user_id = match self.gateway.authenticate(&credentials).await {
            Ok(user_id) => user_id,
            Err(err) => return Err(self.reject(Transition::SignIn, err.into())),
        };
        let partial = UserProfile::new(user_id.clone(), "", credentials.email().as_ref());
        self.record_session(&user_id);
        self.store
            .dispatch(Transition::SignIn(Lifecycle::Fulfilled(partial.clone())));

        let stored = self.fetch_profile(&user_id).await?;
        self.notifier.notify(Notice::success(LOGGED_IN_NOTICE));
        info!(user_id = %user_id, "signed in");
        Ok(stored.unwrap_or(partial))
    }

    /// End the session locally; the backend sign-out runs detached.
    pub fn sign_out(&self) {
        self.guard.end_session();
    }

    /// Ask the backend to send a password reset link.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        if email.trim().is_empty() {
            self.notifier.notify(Notice::info(ENTER_EMAIL_NOTICE));
            return Err(Error::invalid_request(ENTER_EMAIL_NOTICE));
        }
        let email = EmailAddress::new(email).map_err(|err| self.reject_form(err.into()))?;
        if let Err(err) = self.gateway.request_password_reset(&email).await {
            let error = Error::from(err);
            self.notifier.notify(Notice::error(error.message()));
            return Err(error);
        }
        self.notifier.notify(Notice::info(RESET_SENT_NOTICE));
        Ok(())
    }

    /// Clear the profile while switching between sign-in and sign-up forms.
    pub fn reset_user(&self) {
        self.store.dispatch(Transition::ResetUser);
    }

    /// Current phase, forcing a sign-out first if the session has expired.
    ///
    /// The call that forces the sign-out reports [`SessionPhase::Expired`];
    /// later calls see [`SessionPhase::Anonymous`].
    pub fn phase(&self) -> SessionPhase {
        if self.guard.enforce_expiry() {
            return SessionPhase::Expired;
        }
        if self.authenticating.load(Ordering::SeqCst) > 0 {
            return SessionPhase::Authenticating;
        }
        if self.store.select(|state| state.is_authenticated()) {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Signed-in identity after the expiry check, if any.
    pub fn current_user(&self) -> Option<UserId> {
        self.guard.current_user()
    }

    /// Apply one identity report from the provider.
    ///
    /// A still-valid backend credential enters the authenticated phase
    /// directly: the session is recorded and the profile fetched.
    pub async fn restore(&self, report: Option<UserId>) -> Result<(), Error> {
        let Some(user_id) = report else {
            debug!("identity provider reports no credential");
            return Ok(());
        };
        if self.authenticating.load(Ordering::SeqCst) > 0 {
            debug!(user_id = %user_id, "interactive sign-in in progress; ignoring report");
            return Ok(());
        }
        let now = self.guard.now();
        let stored = self.guard.load_expiry();
        if let Some(expires_at) = stored.filter(|expires_at| *expires_at <= now) {
            self.guard.expire(expires_at);
            return Ok(());
        }
        let already_current = self
            .store
            .select(|state| state.current_user_id() == Some(&user_id));
        if already_current {
            return Ok(());
        }

        let expires_at = match stored {
            Some(expires_at) => expires_at,
            None => self.guard.persist_expiry(self.policy.expiry_from(now)),
        };
        self.store.dispatch(Transition::SessionRecorded(Session::authenticated(
            user_id.clone(),
            expires_at,
        )));
        info!(user_id = %user_id, "restoring session from backend credential");
        self.fetch_profile(&user_id).await.map(|_| ())
    }

    /// Start the passive identity subscription.
    ///
    /// Needs a Tokio runtime; the returned handle stops the subscription
    /// when dropped.
    pub fn subscribe_identity(&self) -> Result<IdentitySubscription, Error> {
        let handle = Handle::try_current()
            .map_err(|_| Error::internal("identity subscription requires an async runtime"))?;
        let (ready_tx, ready_rx) = watch::channel(false);
        let manager = self.clone();
        let mut changes = self.gateway.identity_changes();
        let task = handle.spawn(async move {
            while let Some(report) = changes.next().await {
                if let Err(error) = manager.restore(report).await {
                    warn!(error = %error, "identity report could not be applied");
                }
                ready_tx.send_replace(true);
            }
            ready_tx.send_replace(true);
        });
        Ok(IdentitySubscription::new(task, ready_rx))
    }

    /// Read the profile for `user_id`, retrying before demoting the user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, Error> {
        self.store
            .dispatch(Transition::ProfileFetch(Lifecycle::Pending));
        let attempts = self.policy.profile_fetch_attempts();
        let mut last_error = None;
        for attempt in 1..=attempts {
            match self.gateway.read_profile(user_id).await {
                Ok(profile) => {
                    self.store
                        .dispatch(Transition::ProfileFetch(Lifecycle::Fulfilled(profile.clone())));
                    return Ok(profile);
                }
                Err(err) => {
                    warn!(user_id = %user_id, attempt, attempts, error = %err, "profile fetch failed");
                    last_error = Some(err);
                }
            }
        }

        let error = last_error.map_or_else(
            || Error::internal("profile fetch was not attempted"),
            Error::from,
        );
        let error = self.reject(Transition::ProfileFetch, error);
        self.guard.clear_expiry();
        self.store.dispatch(Transition::SessionCleared);
        Err(error)
    }

    fn reject<T>(&self, transition: fn(Lifecycle<T>) -> Transition, error: Error) -> Error {
        self.notifier.notify(Notice::error(error.message()));
        self.store
            .dispatch(transition(Lifecycle::Rejected(error.clone())));
        error
    }

    fn reject_form(&self, error: Error) -> Error {
        self.notifier.notify(Notice::error(error.message()));
        error
    }

    fn record_session(&self, user_id: &UserId) {
        let expires_at = self
            .guard
            .persist_expiry(self.policy.expiry_from(self.guard.now()));
        self.store.dispatch(Transition::SessionRecorded(Session::authenticated(
            user_id.clone(),
            expires_at,
        )));
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
