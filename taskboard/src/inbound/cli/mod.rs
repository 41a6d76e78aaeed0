//! Command-line surface over the stores.
//!
//! Arguments are parsed with `clap`, executed against a [`TaskBoard`] and
//! rendered either as plain text or as JSON.
//!
//! [`TaskBoard`]: crate::wiring::TaskBoard

mod commands;
mod render;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::domain::{Role, TaskId, TaskPriority, TaskStatus, UserId};

pub use commands::{CommandError, execute};

/// `taskboard` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskboard",
    about = "Role-based store task board backed by Supabase",
    version
)]
pub struct CliArgs {
    /// Emit JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    /// Email of the acting user.
    #[arg(long, env = "TASKBOARD_EMAIL", global = true)]
    pub email: Option<String>,
    /// Password of the acting user.
    #[arg(long, env = "TASKBOARD_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the dashboard for the acting user's role.
    Dashboard,
    /// Create the first manager with the acting credentials.
    Setup,
    /// Register the acting credentials as a new account.
    Signup(SignupArgs),
    /// Roster commands.
    #[command(subcommand)]
    Users(UsersCommand),
    /// Task commands.
    #[command(subcommand)]
    Tasks(TasksCommand),
}

/// Self-registration fields.
#[derive(Debug, Clone, Args)]
pub struct SignupArgs {
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// `funcionario`, `supervisor` or `gerente`.
    #[arg(long, value_parser = parse_role, default_value = "funcionario")]
    pub role: Role,
    /// Department.
    #[arg(long)]
    pub department: Option<String>,
}

/// Roster commands.
#[derive(Debug, Clone, Subcommand)]
pub enum UsersCommand {
    /// List every profile ordered by name.
    List,
    /// Create an account (managers only once a manager exists).
    Create(CreateUserArgs),
}

/// Fields of an account created by a manager.
#[derive(Debug, Clone, Args)]
pub struct CreateUserArgs {
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Email of the new account.
    #[arg(long = "user-email")]
    pub user_email: String,
    /// Password of the new account.
    #[arg(long = "user-password")]
    pub user_password: String,
    /// `funcionario`, `supervisor` or `gerente`.
    #[arg(long, value_parser = parse_role)]
    pub role: Role,
    /// Department.
    #[arg(long)]
    pub department: Option<String>,
}

/// Task commands.
#[derive(Debug, Clone, Subcommand)]
pub enum TasksCommand {
    /// List tasks, newest first.
    List(ListTasksArgs),
    /// Assign a new task.
    Add(AddTaskArgs),
    /// Change fields of a task.
    Update(UpdateTaskArgs),
    /// Mark a task as done.
    Complete {
        /// Task id.
        #[arg(value_parser = parse_task_id)]
        id: TaskId,
    },
}

/// Listing filters.
#[derive(Debug, Clone, Args)]
pub struct ListTasksArgs {
    /// Only tasks in this status.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this user id.
    #[arg(long, value_parser = parse_user_id)]
    pub assignee: Option<UserId>,
}

/// Fields of a new task.
#[derive(Debug, Clone, Args)]
pub struct AddTaskArgs {
    /// Title.
    #[arg(long)]
    pub title: String,
    /// Assignee user id.
    #[arg(long, value_parser = parse_user_id)]
    pub assignee: UserId,
    /// Description.
    #[arg(long, default_value = "")]
    pub description: String,
    /// `baixa`, `media` or `alta`.
    #[arg(long, value_parser = parse_priority, default_value = "media")]
    pub priority: TaskPriority,
    /// Due date as `YYYY-MM-DD` or RFC 3339.
    #[arg(long, value_parser = parse_due_date)]
    pub due: Option<DateTime<Utc>>,
}

/// Fields to change on a task; at least one is required.
#[derive(Debug, Clone, Args)]
pub struct UpdateTaskArgs {
    /// Task id.
    #[arg(value_parser = parse_task_id)]
    pub id: TaskId,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// New description.
    #[arg(long)]
    pub description: Option<String>,
    /// `pendente`, `em_andamento` or `concluida`.
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,
    /// `baixa`, `media` or `alta`.
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<TaskPriority>,
    /// Due date as `YYYY-MM-DD` or RFC 3339.
    #[arg(long, value_parser = parse_due_date)]
    pub due: Option<DateTime<Utc>>,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.trim().parse().map_err(|err| format!("{err}"))
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    raw.trim().parse().map_err(|err| format!("{err}"))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    raw.trim().parse().map_err(|err| format!("{err}"))
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_user_id(raw: &str) -> Result<UserId, String> {
    UserId::new(raw.trim()).map_err(|err| format!("{err}"))
}

fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| format!("invalid due date {raw:?}; expected YYYY-MM-DD or RFC 3339"))
}
