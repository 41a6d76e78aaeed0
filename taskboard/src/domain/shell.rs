//! Top-level view selection.

use serde::Serialize;

use crate::domain::dashboard::Dashboard;
use crate::domain::session::SessionSnapshot;
use crate::domain::{Task, User};

/// What the shell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "dashboard", rename_all = "snake_case")]
pub enum ShellView {
    /// The session is still resolving.
    Loading,
    /// Nobody is signed in and no manager exists yet.
    InitialSetup,
    /// Nobody is signed in.
    Login,
    /// Dashboard for the signed-in user's role.
    Dashboard(Dashboard),
}

/// Pick the view for the current state.
///
/// # Examples
/// ```
/// use taskboard::domain::{SessionSnapshot, ShellView, route};
///
/// let anonymous = SessionSnapshot { user: None, loading: false };
/// assert_eq!(route(&anonymous, &[], &[]), ShellView::InitialSetup);
/// ```
pub fn route(session: &SessionSnapshot, roster: &[User], tasks: &[Task]) -> ShellView {
    if session.loading {
        return ShellView::Loading;
    }
    match &session.user {
        Some(user) => ShellView::Dashboard(Dashboard::for_user(user, roster, tasks)),
        None if roster.iter().any(User::is_manager) => ShellView::Login,
        None => ShellView::InitialSetup,
    }
}
