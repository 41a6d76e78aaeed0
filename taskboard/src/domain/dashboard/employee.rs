//! Employee view: the signed-in user's own tasks split by status.

use serde::Serialize;

use crate::domain::{Task, TaskStatus, User};

use super::StatusTotals;

/// Own tasks grouped by status, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    /// The signed-in employee.
    pub user: User,
    /// Counts over the employee's own tasks.
    pub totals: StatusTotals,
    /// Tasks not started yet.
    pub pending: Vec<Task>,
    /// Tasks being worked on.
    pub in_progress: Vec<Task>,
    /// Finished tasks.
    pub done: Vec<Task>,
}

impl EmployeeDashboard {
    /// Project the dashboard for `user`.
    pub fn project(user: &User, tasks: &[Task]) -> Self {
        let own: Vec<&Task> = tasks
            .iter()
            .filter(|task| &task.assigned_to == user.id())
            .collect();
        let with_status = |status: TaskStatus| -> Vec<Task> {
            own.iter()
                .filter(|task| task.status == status)
                .map(|task| (*task).clone())
                .collect()
        };

        Self {
            user: user.clone(),
            totals: StatusTotals::tally(own.iter().copied()),
            pending: with_status(TaskStatus::Pending),
            in_progress: with_status(TaskStatus::InProgress),
            done: with_status(TaskStatus::Done),
        }
    }
}
