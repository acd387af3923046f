//! Wiring that builds every service from one ports bundle.
//!
//! A [`ClientContext`] owns the shared store plus the services driving it,
//! and holds the identity subscription once [`ClientContext::start`] runs.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::config::{ClientSettings, SettingsError};
use crate::domain::ports::{
    AssetStorage, ExpirySlot, IdentityProvider, Notifier, ProfileRepository, ProjectRepository,
};
use crate::domain::{
    Error, GatewayPorts, IdentitySubscription, LikeSynchronizer, ProfileEditor, ProjectPublisher,
    RemoteGateway, SessionManager, SessionPolicy, SharedClock, StateStore,
};
use crate::outbound::{MemoryBackend, MemoryExpirySlot, TracingNotifier};

/// Parameter object bundling all port implementations for the services.
#[derive(Clone)]
pub struct ClientPorts {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub assets: Arc<dyn AssetStorage>,
    pub expiry: Arc<dyn ExpirySlot>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: SharedClock,
}

impl ClientPorts {
    /// Ports backed by `backend` for every remote concern, with an
    /// in-memory expiry slot, tracing notices and the system clock.
    ///
    /// # Examples
    /// ```
    /// use client::context::ClientPorts;
    /// use client::outbound::MemoryBackend;
    ///
    /// let ports = ClientPorts::in_memory(&MemoryBackend::new());
    /// assert!(ports.expiry.load().unwrap().is_none());
    /// ```
    pub fn in_memory(backend: &MemoryBackend) -> Self {
        Self {
            identity: Arc::new(backend.clone()),
            profiles: Arc::new(backend.clone()),
            projects: Arc::new(backend.clone()),
            assets: Arc::new(backend.clone()),
            expiry: Arc::new(MemoryExpirySlot::new()),
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the expiry slot.
    pub fn with_expiry(mut self, expiry: Arc<dyn ExpirySlot>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }
}

/// Every service of one application run, sharing one store.
pub struct ClientContext {
    store: StateStore,
    session: SessionManager,
    likes: LikeSynchronizer,
    profiles: ProfileEditor,
    projects: ProjectPublisher,
    subscription: Option<IdentitySubscription>,
}

impl ClientContext {
    pub fn new(ports: ClientPorts, policy: SessionPolicy) -> Self {
        let gateway = RemoteGateway::new(
            GatewayPorts {
                identity: ports.identity,
                profiles: ports.profiles,
                projects: ports.projects,
                assets: ports.assets,
            },
            policy.max_upload_bytes(),
        );
        let store = StateStore::default();
        let session = SessionManager::new(
            gateway.clone(),
            store.clone(),
            ports.expiry,
            ports.notifier.clone(),
            ports.clock,
            policy,
        );
        let guard = session.guard().clone();
        Self {
            likes: LikeSynchronizer::new(gateway.clone(), guard.clone(), ports.notifier.clone()),
            profiles: ProfileEditor::new(gateway.clone(), guard.clone(), ports.notifier.clone()),
            projects: ProjectPublisher::new(gateway, guard, ports.notifier),
            session,
            store,
            subscription: None,
        }
    }

    /// Build a context from validated settings; the expiry slot follows
    /// `expiry_path`.
    pub fn from_settings(
        settings: &ClientSettings,
        ports: ClientPorts,
    ) -> Result<Self, SettingsError> {
        let policy = settings.session_policy()?;
        Ok(Self::new(ports.with_expiry(settings.expiry_slot()), policy))
    }

    /// Start the identity subscription, replacing any earlier one.
    pub fn start(&mut self) -> Result<&IdentitySubscription, Error> {
        let subscription = self.session.subscribe_identity()?;
        Ok(self.subscription.insert(subscription))
    }

    /// Stop the identity subscription, if running.
    pub fn stop(&mut self) {
        self.subscription = None;
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn likes(&self) -> &LikeSynchronizer {
        &self.likes
    }

    pub fn profiles(&self) -> &ProfileEditor {
        &self.profiles
    }

    pub fn projects(&self) -> &ProjectPublisher {
        &self.projects
    }
}

#[cfg(test)]
mod tests {
    //! Wiring checks against the in-memory backend.
    use super::*;
    use crate::domain::{ErrorCode, SessionPhase};
    use crate::test_support::{MutableClock, RecordingNotifier, fixture_now};
    use rstest::rstest;

    fn context(backend: &MemoryBackend) -> ClientContext {
        let ports = ClientPorts::in_memory(backend)
            .with_notifier(Arc::new(RecordingNotifier::default()))
            .with_clock(Arc::new(MutableClock::new(fixture_now())));
        ClientContext::new(ports, SessionPolicy::default())
    }

    #[rstest]
    #[tokio::test]
    async fn services_share_one_store() {
        let backend = MemoryBackend::new();
        backend
            .seed_account("ada@example.com", "secret", "Ada")
            .expect("seed account");
        let ctx = context(&backend);

        ctx.session()
            .sign_in("ada@example.com", "secret")
            .await
            .expect("sign-in succeeds");

        assert!(ctx.store().select(|state| state.is_authenticated()));
        assert_eq!(ctx.session().phase(), SessionPhase::Authenticated);
    }

    #[rstest]
    #[tokio::test]
    async fn start_restores_the_backend_credential() {
        let backend = MemoryBackend::new();
        let user_id = backend
            .seed_account("ada@example.com", "secret", "Ada")
            .expect("seed account");
        backend.set_current_identity(Some(user_id.clone()));
        let mut ctx = context(&backend);

        ctx.start().expect("runtime available").ready().await;

        assert_eq!(ctx.session().current_user(), Some(user_id));
        ctx.stop();
    }

    #[rstest]
    fn start_without_runtime_fails() {
        let mut ctx = context(&MemoryBackend::new());
        let err = ctx.start().expect_err("no runtime");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn invalid_settings_are_rejected() {
        let settings = ClientSettings {
            session_ttl_hours: 0,
            max_upload_bytes: 1,
            profile_fetch_attempts: 1,
            expiry_path: None,
        };
        let ports = ClientPorts::in_memory(&MemoryBackend::new());
        let result = ClientContext::from_settings(&settings, ports);
        assert!(matches!(result, Err(SettingsError::ZeroSessionTtl)));
    }
}
