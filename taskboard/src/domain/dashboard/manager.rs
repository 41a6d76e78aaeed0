//! Manager view: organisation-wide metrics.

use std::cmp::Reverse;

use serde::Serialize;

use crate::domain::{Role, Task, TaskPriority, TaskStatus, User};

use super::{EmployeeLoad, RECENT_LIMIT, RecentTask, StatusTotals};

/// Users per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCounts {
    /// Users with role `funcionario`.
    pub employees: usize,
    /// Users with role `supervisor`.
    pub supervisors: usize,
    /// Users with role `gerente`.
    pub managers: usize,
}

impl RoleCounts {
    fn tally(roster: &[User]) -> Self {
        roster.iter().fold(Self::default(), |mut counts, user| {
            match user.role() {
                Role::Employee => counts.employees += 1,
                Role::Supervisor => counts.supervisors += 1,
                Role::Manager => counts.managers += 1,
            }
            counts
        })
    }
}

/// Tasks per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    /// Tasks with priority `baixa`.
    pub low: usize,
    /// Tasks with priority `media`.
    pub medium: usize,
    /// Tasks with priority `alta`.
    pub high: usize,
}

impl PriorityCounts {
    fn tally(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            match task.priority {
                TaskPriority::Low => counts.low += 1,
                TaskPriority::Medium => counts.medium += 1,
                TaskPriority::High => counts.high += 1,
            }
            counts
        })
    }
}

/// Organisation overview for managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    /// Users per role.
    pub roles: RoleCounts,
    /// Also serves as the status distribution.
    pub totals: StatusTotals,
    /// Done tasks as a whole percentage of all tasks.
    pub completion_rate: usize,
    /// Employees with no pending task; in-progress work does not count.
    pub available_employees: Vec<User>,
    /// Task counts per employee.
    pub workload: Vec<EmployeeLoad>,
    /// Tasks per priority.
    pub priorities: PriorityCounts,
    /// Most recently updated tasks first.
    pub recent_activity: Vec<RecentTask>,
}

impl ManagerDashboard {
    /// Project the overview from the roster and the task list.
    pub fn project(roster: &[User], tasks: &[Task]) -> Self {
        let employees: Vec<&User> = roster
            .iter()
            .filter(|user| user.role() == Role::Employee)
            .collect();
        let available_employees = employees
            .iter()
            .filter(|employee| {
                !tasks.iter().any(|task| {
                    &task.assigned_to == employee.id() && task.status == TaskStatus::Pending
                })
            })
            .map(|employee| (*employee).clone())
            .collect();
        let workload = employees
            .iter()
            .map(|employee| EmployeeLoad::of(employee, tasks))
            .collect();

        let mut by_update: Vec<&Task> = tasks.iter().collect();
        by_update.sort_by_key(|task| Reverse(task.updated_at));
        let recent_activity = by_update
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|task| RecentTask::resolve(task, roster))
            .collect();

        let totals = StatusTotals::tally(tasks);
        Self {
            roles: RoleCounts::tally(roster),
            totals,
            completion_rate: totals.completion_rate(),
            available_employees,
            workload,
            priorities: PriorityCounts::tally(tasks),
            recent_activity,
        }
    }
}
