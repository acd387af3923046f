//! Observable handle around the application state tree.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::state::{ApplicationState, Transition};

/// Cloneable handle to the single [`ApplicationState`] of a run.
///
/// Transitions are serialised by the channel's internal lock and applied
/// even when nobody is subscribed.
///
/// # Examples
/// ```
/// use client::domain::{StateStore, Transition};
///
/// let store = StateStore::default();
/// store.dispatch(Transition::ResetUser);
/// assert!(!store.select(|state| state.is_authenticated()));
/// ```
#[derive(Debug, Clone)]
pub struct StateStore {
    sender: Arc<watch::Sender<ApplicationState>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(ApplicationState::default())
    }
}

impl StateStore {
    pub fn new(initial: ApplicationState) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Apply `transition` and notify subscribers.
    pub fn dispatch(&self, transition: Transition) {
        let name = transition.name();
        let phase = transition.phase().unwrap_or("-");
        self.sender.send_modify(|state| state.apply(transition));
        debug!(transition = name, phase, "state transition applied");
    }

    /// Receiver observing every committed state.
    pub fn subscribe(&self) -> watch::Receiver<ApplicationState> {
        self.sender.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ApplicationState {
        self.sender.borrow().clone()
    }

    /// Read a value derived from the current state.
    pub fn select<T>(&self, selector: impl FnOnce(&ApplicationState) -> T) -> T {
        let state = self.sender.borrow();
        selector(&state)
    }
}
