//! Driven port for user-visible notices.
//!
//! Notices are the only channel through which store failures reach the
//! user; stores never propagate errors past their boundary.

use serde::Serialize;

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeTone {
    /// Confirmation of a completed action.
    Info,
    /// A failure the user should act on.
    Destructive,
}

/// Short title plus description shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Headline.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Visual emphasis.
    pub tone: NoticeTone,
}

impl Notice {
    /// Confirmation notice.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: NoticeTone::Info,
        }
    }

    /// Failure notice.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone: NoticeTone::Destructive,
        }
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    /// Deliver a notice.
    fn notify(&self, notice: Notice);
}

/// Notifier that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: Notice) {}
}
