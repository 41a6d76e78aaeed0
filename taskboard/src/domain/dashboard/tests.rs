//! Regression coverage for the dashboard projections.

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{ErrorCode, TaskId, TaskPriority, UserId};

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 9, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn user(name: &str, role: Role) -> User {
    User::try_new(
        UserId::random(),
        name,
        format!("{}@loja.com", name.to_lowercase()),
        role,
        None,
    )
    .expect("valid user")
}

fn task(assignee: &User, status: TaskStatus, priority: TaskPriority, updated: u32) -> Task {
    Task {
        id: TaskId::random(),
        title: format!("Tarefa {updated}"),
        description: String::new(),
        assigned_to: assignee.id().clone(),
        assigned_by: UserId::random(),
        status,
        priority,
        created_at: at(0),
        updated_at: at(updated),
        due_date: None,
        completed_at: (status == TaskStatus::Done).then(|| at(updated)),
    }
}

struct Team {
    manager: User,
    supervisor: User,
    ana: User,
    bruno: User,
    carla: User,
}

#[fixture]
fn team() -> Team {
    Team {
        manager: user("Gerente", Role::Manager),
        supervisor: user("Sofia", Role::Supervisor),
        ana: user("Ana", Role::Employee),
        bruno: user("Bruno", Role::Employee),
        carla: user("Carla", Role::Employee),
    }
}

impl Team {
    fn roster(&self) -> Vec<User> {
        vec![
            self.ana.clone(),
            self.bruno.clone(),
            self.carla.clone(),
            self.manager.clone(),
            self.supervisor.clone(),
        ]
    }
}

#[rstest]
fn manager_metrics_for_one_pending_and_one_done(team: Team) {
    let tasks = vec![
        task(&team.ana, TaskStatus::Pending, TaskPriority::High, 1),
        task(&team.bruno, TaskStatus::Done, TaskPriority::Low, 2),
    ];

    let dashboard = ManagerDashboard::project(&team.roster(), &tasks);

    assert_eq!(dashboard.completion_rate, 50);
    assert_eq!(dashboard.priorities.high, 1);
    assert_eq!(dashboard.priorities.low, 1);
    assert_eq!(dashboard.totals.pending, 1);
    assert_eq!(dashboard.totals.done, 1);
    assert_eq!(
        dashboard.roles,
        RoleCounts {
            employees: 3,
            supervisors: 1,
            managers: 1
        }
    );
}

#[rstest]
fn in_progress_work_leaves_employee_available(team: Team) {
    let tasks = vec![
        task(&team.ana, TaskStatus::Pending, TaskPriority::Medium, 1),
        task(&team.bruno, TaskStatus::InProgress, TaskPriority::Medium, 2),
        task(&team.bruno, TaskStatus::Done, TaskPriority::Medium, 3),
    ];

    let dashboard = ManagerDashboard::project(&team.roster(), &tasks);
    let available: Vec<&str> = dashboard
        .available_employees
        .iter()
        .map(User::name)
        .collect();

    assert_eq!(available, vec!["Bruno", "Carla"]);
}

#[rstest]
fn recent_activity_follows_updated_at(team: Team) {
    let tasks: Vec<Task> = (1..=7)
        .map(|minute| task(&team.ana, TaskStatus::Pending, TaskPriority::Medium, minute))
        .collect();

    let dashboard = ManagerDashboard::project(&team.roster(), &tasks);
    let minutes: Vec<DateTime<Utc>> = dashboard
        .recent_activity
        .iter()
        .map(|recent| recent.task.updated_at)
        .collect();

    assert_eq!(minutes, vec![at(7), at(6), at(5), at(4), at(3)]);
}

#[rstest]
fn workload_counts_each_status(team: Team) {
    let tasks = vec![
        task(&team.carla, TaskStatus::Pending, TaskPriority::Medium, 1),
        task(&team.carla, TaskStatus::InProgress, TaskPriority::Medium, 2),
        task(&team.carla, TaskStatus::Done, TaskPriority::Medium, 3),
    ];

    let dashboard = ManagerDashboard::project(&team.roster(), &tasks);
    let carla = dashboard
        .workload
        .iter()
        .find(|load| load.employee.id() == team.carla.id())
        .expect("carla listed");

    assert_eq!(
        carla.totals,
        StatusTotals {
            total: 3,
            pending: 1,
            in_progress: 1,
            done: 1
        }
    );
}

#[rstest]
fn supervisor_recent_keeps_list_order_and_flags_missing_users(team: Team) {
    let stranger = user("Ex", Role::Employee);
    let tasks = vec![
        task(&team.ana, TaskStatus::Pending, TaskPriority::Medium, 1),
        task(&stranger, TaskStatus::Pending, TaskPriority::Medium, 9),
    ];

    let dashboard = SupervisorDashboard::project(&team.roster(), &tasks);
    let names: Vec<&str> = dashboard
        .recent
        .iter()
        .map(|recent| recent.assignee_name.as_str())
        .collect();

    assert_eq!(names, vec!["Ana", MISSING_USER_LABEL]);
    assert_eq!(dashboard.employees.len(), 3);
    assert_eq!(dashboard.totals.total, 2);
}

#[rstest]
fn employee_sees_only_own_tasks(team: Team) {
    let tasks = vec![
        task(&team.ana, TaskStatus::Pending, TaskPriority::Medium, 1),
        task(&team.ana, TaskStatus::Done, TaskPriority::Medium, 2),
        task(&team.bruno, TaskStatus::Pending, TaskPriority::Medium, 3),
    ];

    let dashboard = EmployeeDashboard::project(&team.ana, &tasks);

    assert_eq!(dashboard.pending.len(), 1);
    assert!(dashboard.in_progress.is_empty());
    assert_eq!(dashboard.done.len(), 1);
    assert_eq!(dashboard.totals.total, 2);
}

#[rstest]
#[case(0, 0, 0)]
#[case(1, 2, 50)]
#[case(1, 3, 33)]
#[case(2, 3, 67)]
#[case(1, 8, 13)]
#[case(4, 4, 100)]
fn completion_rate_rounds_half_up(#[case] done: usize, #[case] total: usize, #[case] rate: usize) {
    let totals = StatusTotals {
        total,
        done,
        ..StatusTotals::default()
    };
    assert_eq!(totals.completion_rate(), rate);
}

#[rstest]
#[case(Role::Employee)]
#[case(Role::Supervisor)]
#[case(Role::Manager)]
fn dashboard_matches_role(#[case] role: Role) {
    let viewer = user("Vera", role);
    let dashboard = Dashboard::for_user(&viewer, std::slice::from_ref(&viewer), &[]);
    let matched = match dashboard {
        Dashboard::Employee(_) => Role::Employee,
        Dashboard::Supervisor(_) => Role::Supervisor,
        Dashboard::Manager(_) => Role::Manager,
    };
    assert_eq!(matched, role);
}

#[rstest]
fn anonymous_users_change_nothing(team: Team) {
    let work = task(&team.ana, TaskStatus::Pending, TaskPriority::Low, 1);
    let error = Dashboard::authorize(None, TaskAction::Complete(&work)).expect_err("refused");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
fn employees_only_complete_their_own_tasks(team: Team) {
    let own = task(&team.ana, TaskStatus::Pending, TaskPriority::Low, 1);
    let other = task(&team.bruno, TaskStatus::Pending, TaskPriority::Low, 2);

    assert!(Dashboard::authorize(Some(&team.ana), TaskAction::Complete(&own)).is_ok());
    for action in [
        TaskAction::Complete(&other),
        TaskAction::Edit(&own),
        TaskAction::Create {
            assignee: team.ana.id(),
        },
        TaskAction::Create {
            assignee: team.bruno.id(),
        },
    ] {
        let error = Dashboard::authorize(Some(&team.ana), action).expect_err("refused");
        assert_eq!(error.code(), ErrorCode::Forbidden, "{action:?}");
    }
}

#[rstest]
fn assigners_manage_tasks_of_others(team: Team) {
    let work = task(&team.ana, TaskStatus::Pending, TaskPriority::Low, 1);
    for acting in [&team.supervisor, &team.manager] {
        for action in [
            TaskAction::Create {
                assignee: team.ana.id(),
            },
            TaskAction::Edit(&work),
            TaskAction::Complete(&work),
        ] {
            assert!(Dashboard::authorize(Some(acting), action).is_ok(), "{action:?}");
        }
    }
}

#[rstest]
fn nobody_assigns_a_task_to_themselves(team: Team) {
    let error = Dashboard::authorize(
        Some(&team.supervisor),
        TaskAction::Create {
            assignee: team.supervisor.id(),
        },
    )
    .expect_err("refused");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}
