//! Notifier that turns notices into log events.

use tracing::{info, warn};

use crate::domain::ports::{Notice, NoticeTone, Notifier};

/// Emits every notice as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.tone {
            NoticeTone::Info => info!(title = %notice.title, description = %notice.description, "notice"),
            NoticeTone::Destructive => {
                warn!(title = %notice.title, description = %notice.description, "notice");
            }
        }
    }
}
