//! Role-specific dashboard projections.
//!
//! Projections are pure functions of the signed-in user, the loaded roster
//! and the loaded tasks. Nothing here touches a port.

mod employee;
mod manager;
mod supervisor;

use serde::Serialize;

use crate::domain::{Error, Role, Task, TaskStatus, User, UserId};

pub use employee::EmployeeDashboard;
pub use manager::{ManagerDashboard, PriorityCounts, RoleCounts};
pub use supervisor::{RecentTask, SupervisorDashboard};

/// Number of tasks listed under recent work.
pub const RECENT_LIMIT: usize = 5;

/// Label shown when a task references a user missing from the roster.
pub const MISSING_USER_LABEL: &str = "Funcionário não encontrado";

/// Task counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotals {
    /// All tasks.
    pub total: usize,
    /// Tasks with status `pendente`.
    pub pending: usize,
    /// Tasks with status `em_andamento`.
    pub in_progress: usize,
    /// Tasks with status `concluida`.
    pub done: usize,
}

impl StatusTotals {
    /// Count `tasks` by status.
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut totals, task| {
            totals.total += 1;
            match task.status {
                TaskStatus::Pending => totals.pending += 1,
                TaskStatus::InProgress => totals.in_progress += 1,
                TaskStatus::Done => totals.done += 1,
            }
            totals
        })
    }

    /// Share of done tasks as a whole percentage, rounded half up.
    ///
    /// # Examples
    /// ```
    /// use taskboard::domain::dashboard::StatusTotals;
    ///
    /// let totals = StatusTotals { total: 3, pending: 1, in_progress: 0, done: 2 };
    /// assert_eq!(totals.completion_rate(), 67);
    /// assert_eq!(StatusTotals::default().completion_rate(), 0);
    /// ```
    pub fn completion_rate(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.done * 200 + self.total) / (self.total * 2)
    }
}

/// Workload of one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeLoad {
    /// The employee the counts belong to.
    pub employee: User,
    /// Counts over the tasks assigned to `employee`.
    pub totals: StatusTotals,
}

impl EmployeeLoad {
    fn of(employee: &User, tasks: &[Task]) -> Self {
        Self {
            employee: employee.clone(),
            totals: StatusTotals::tally(
                tasks
                    .iter()
                    .filter(|task| &task.assigned_to == employee.id()),
            ),
        }
    }
}

/// Dashboard for the signed-in user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    /// Own work of an employee.
    Employee(EmployeeDashboard),
    /// Team view of a supervisor.
    Supervisor(SupervisorDashboard),
    /// Organisation view of a manager.
    Manager(ManagerDashboard),
}

impl Dashboard {
    /// Project the dashboard matching `user`'s role.
    pub fn for_user(user: &User, roster: &[User], tasks: &[Task]) -> Self {
        match user.role() {
            Role::Employee => Self::Employee(EmployeeDashboard::project(user, tasks)),
            Role::Supervisor => Self::Supervisor(SupervisorDashboard::project(roster, tasks)),
            Role::Manager => Self::Manager(ManagerDashboard::project(roster, tasks)),
        }
    }

    /// Check that `user` may perform `action` from their dashboard.
    ///
    /// Supervisors and managers create and edit tasks for others. An
    /// employee only completes tasks assigned to them.
    pub fn authorize(user: Option<&User>, action: TaskAction<'_>) -> Result<(), Error> {
        let Some(user) = user else {
            return Err(Error::unauthorized("Faça login para alterar tarefas"));
        };
        let assigns = matches!(user.role(), Role::Supervisor | Role::Manager);
        match action {
            TaskAction::Create { .. } if !assigns => Err(Error::forbidden(
                "Apenas supervisores e gerentes podem criar tarefas",
            )),
            TaskAction::Create { assignee } if assignee == user.id() => Err(
                Error::invalid_request("Não é possível atribuir uma tarefa a si mesmo"),
            ),
            TaskAction::Create { .. } => Ok(()),
            TaskAction::Edit(_) if assigns => Ok(()),
            TaskAction::Edit(_) => Err(Error::forbidden(
                "Apenas supervisores e gerentes podem editar tarefas",
            )),
            TaskAction::Complete(task) if assigns || &task.assigned_to == user.id() => Ok(()),
            TaskAction::Complete(_) => Err(Error::forbidden(
                "Só é possível concluir as próprias tarefas",
            )),
        }
    }
}

/// Task mutation requested from a dashboard.
#[derive(Debug, Clone, Copy)]
pub enum TaskAction<'a> {
    /// Create a task for `assignee`.
    Create {
        /// User the task is assigned to.
        assignee: &'a UserId,
    },
    /// Change fields of an existing task.
    Edit(&'a Task),
    /// Mark an existing task done.
    Complete(&'a Task),
}

#[cfg(test)]
mod tests;
