//! Optimistic like/star toggling with reconciliation against the backend.
//!
//! A toggle flips the viewer's membership with an atomic set operation,
//! adjusts the displayed count by one, then refetches the listing. The
//! refetched liker set supersedes every provisional value, so rapid toggles
//! that briefly drift are corrected on the next successful read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::Error;
use super::gateway::RemoteGateway;
use super::ports::{Notice, Notifier};
use super::project::{Project, ProjectId};
use super::session_guard::SessionGuard;
use super::state::Transition;
use super::store::StateStore;
use super::user::UserId;

pub const TOGGLE_IN_FLIGHT_MESSAGE: &str = "toggle already in flight";

/// Star affordance state shown next to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarState {
    pub project_id: ProjectId,
    pub liked: bool,
    pub count: usize,
}

impl StarState {
    /// Derive the state for `viewer` from an authoritative project copy.
    pub fn from_project(
        project_id: ProjectId,
        project: &Project,
        viewer: Option<&UserId>,
    ) -> Self {
        Self {
            project_id,
            liked: viewer.is_some_and(|viewer| project.is_liked_by(viewer)),
            count: project.like_count(),
        }
    }
}

/// Hands out per-project [`StarToggle`]s sharing one gateway and store.
#[derive(Clone)]
pub struct LikeSynchronizer {
    gateway: RemoteGateway,
    store: StateStore,
    guard: SessionGuard,
    notifier: Arc<dyn Notifier>,
}

impl LikeSynchronizer {
    pub fn new(gateway: RemoteGateway, guard: SessionGuard, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            store: guard.store().clone(),
            guard,
            notifier,
        }
    }

    /// Start tracking the star state of a loaded project.
    pub fn track(&self, project: &Project) -> Result<StarToggle, Error> {
        let project_id = project
            .id
            .clone()
            .ok_or_else(|| Error::invalid_request("project has not been published yet"))?;
        let viewer = self.guard.current_user();
        Ok(StarToggle {
            sync: self.clone(),
            state: Mutex::new(StarState::from_project(
                project_id,
                project,
                viewer.as_ref(),
            )),
            pending: AtomicBool::new(false),
        })
    }
}

/// Star toggle for one project.
pub struct StarToggle {
    sync: LikeSynchronizer,
    state: Mutex<StarState>,
    pending: AtomicBool,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl StarToggle {
    /// Current displayed state.
    pub fn state(&self) -> StarState {
        self.lock_state().clone()
    }

    /// Whether a toggle is waiting on the backend.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Flip the viewer's like.
    ///
    /// Anonymous viewers, including those whose session has just expired,
    /// get [`Error::auth_required`] without any backend call. A failed membership update leaves the state untouched; a failed
    /// refetch keeps the provisional values until the next read.
    pub async fn toggle(&self) -> Result<StarState, Error> {
        let Some(viewer) = self.sync.guard.current_user() else {
            let error = Error::auth_required();
            self.sync.notifier.notify(Notice::info(error.message()));
            return Err(error);
        };
        if self.pending.swap(true, Ordering::SeqCst) {
            return Err(Error::invalid_request(TOGGLE_IN_FLIGHT_MESSAGE));
        }
        let _pending = PendingGuard(&self.pending);

        let project_id = self.lock_state().project_id.clone();
        let intended = !self.lock_state().liked;
        if let Err(err) = self
            .sync
            .gateway
            .set_like_membership(&project_id, &viewer, intended)
            .await
        {
            return Err(self.fail(err.into()));
        }

        {
            let mut state = self.lock_state();
            state.liked = intended;
            state.count = if intended {
                state.count.saturating_add(1)
            } else {
                state.count.saturating_sub(1)
            };
        }
        self.sync.store.dispatch(Transition::LikeApplied {
            project: project_id.clone(),
            user: viewer.clone(),
            liked: intended,
        });
        info!(project_id = %project_id, user_id = %viewer, liked = intended, "like toggled");

        match self.sync.gateway.list_projects().await {
            Ok(listing) => {
                self.sync.store.dispatch(Transition::ListingLoaded(listing));
                self.refresh_from_store();
            }
            Err(err) => {
                warn!(project_id = %project_id, error = %err, "refetch after like toggle failed");
            }
        }
        Ok(self.state())
    }

    /// Replace the displayed state with an authoritative project copy.
    pub fn reconcile(&self, project: &Project) {
        let viewer = self
            .sync
            .store
            .select(|state| state.current_user_id().cloned());
        let mut state = self.lock_state();
        let project_id = state.project_id.clone();
        *state = StarState::from_project(project_id, project, viewer.as_ref());
    }

    /// Reconcile from the store's current listing, if it holds the project.
    pub fn refresh_from_store(&self) {
        let project_id = self.lock_state().project_id.clone();
        let listed = self
            .sync
            .store
            .select(|state| state.listed_project(&project_id).cloned());
        if let Some(project) = listed {
            self.reconcile(&project);
        }
    }

    fn fail(&self, error: Error) -> Error {
        self.sync.notifier.notify(Notice::error(error.message()));
        error
    }

    fn lock_state(&self) -> MutexGuard<'_, StarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "like_sync_tests.rs"]
mod tests;
