//! Supervisor view: team totals, per-employee load and recent tasks.

use serde::Serialize;

use crate::domain::{Role, Task, User};

use super::{EmployeeLoad, MISSING_USER_LABEL, RECENT_LIMIT, StatusTotals};

/// A task with its assignee's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTask {
    /// The listed task.
    pub task: Task,
    /// Assignee's name, or a placeholder when the roster lacks them.
    pub assignee_name: String,
}

impl RecentTask {
    pub(super) fn resolve(task: &Task, roster: &[User]) -> Self {
        let assignee_name = roster
            .iter()
            .find(|user| user.id() == &task.assigned_to)
            .map_or_else(|| MISSING_USER_LABEL.to_owned(), |user| user.name().to_owned());
        Self {
            task: task.clone(),
            assignee_name,
        }
    }
}

/// Team overview for supervisors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorDashboard {
    /// Counts over all tasks.
    pub totals: StatusTotals,
    /// Task counts per employee.
    pub employees: Vec<EmployeeLoad>,
    /// First tasks in list order, not sorted by time.
    pub recent: Vec<RecentTask>,
}

impl SupervisorDashboard {
    /// Project the overview from the roster and the task list.
    pub fn project(roster: &[User], tasks: &[Task]) -> Self {
        let employees = roster
            .iter()
            .filter(|user| user.role() == Role::Employee)
            .map(|employee| EmployeeLoad::of(employee, tasks))
            .collect();
        let recent = tasks
            .iter()
            .take(RECENT_LIMIT)
            .map(|task| RecentTask::resolve(task, roster))
            .collect();

        Self {
            totals: StatusTotals::tally(tasks),
            employees,
            recent,
        }
    }
}
