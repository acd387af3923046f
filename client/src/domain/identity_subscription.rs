//! Scoped handle for the startup identity listener.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Running identity subscription; dropping it stops the listener.
#[derive(Debug)]
pub struct IdentitySubscription {
    task: JoinHandle<()>,
    ready: watch::Receiver<bool>,
}

impl IdentitySubscription {
    pub(crate) fn new(task: JoinHandle<()>, ready: watch::Receiver<bool>) -> Self {
        Self { task, ready }
    }

    /// Resolve once the first identity report has been handled, or the
    /// provider stream has ended.
    pub async fn ready(&self) {
        let mut ready = self.ready.clone();
        if ready.wait_for(|handled| *handled).await.is_err() {
            tracing::debug!("identity listener stopped before reporting");
        }
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
