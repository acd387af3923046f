//! Notification sink that writes notices to the tracing pipeline.

use tracing::{error, info};

use crate::domain::ports::{Notice, NoticeLevel, Notifier};

/// Logs each notice at a level matching its severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(level = "success", text = %notice.message, "notice"),
            NoticeLevel::Info => info!(level = "info", text = %notice.message, "notice"),
            NoticeLevel::Error => error!(level = "error", text = %notice.message, "notice"),
        }
    }
}
