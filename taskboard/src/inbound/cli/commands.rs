//! Command execution against the running stores.

use std::io::{self, Write};

use tracing::{debug, warn};

use super::{
    AddTaskArgs, CliArgs, Command, CreateUserArgs, ListTasksArgs, SignupArgs, TasksCommand,
    UpdateTaskArgs, UsersCommand, render,
};
use crate::domain::{
    Dashboard, Error, KNOWN_DEPARTMENTS, NewTask, NewUser, Task, TaskAction, TaskId, TaskPatch,
    TaskValidationError, User, UserValidationError,
};
use crate::wiring::TaskBoard;

/// Failures reported by the CLI.
///
/// Store operations notify their own failures, so the variants for them only
/// name the operation.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No acting credentials were supplied.
    #[error("credentials required: pass --email/--password or set TASKBOARD_EMAIL/TASKBOARD_PASSWORD")]
    MissingCredentials,
    /// Sign-in did not resolve a profile.
    #[error("login failed")]
    LoginFailed,
    /// A store operation returned false.
    #[error("{0} failed")]
    OperationFailed(&'static str),
    /// A form value was rejected before any backend call.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The signed-in user may not perform the command.
    #[error("refused: {0}")]
    Refused(#[from] Error),
    /// Output could not be written.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<UserValidationError> for CommandError {
    fn from(error: UserValidationError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

impl From<TaskValidationError> for CommandError {
    fn from(error: TaskValidationError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

/// Run `args.command` and write its output to `out`.
pub async fn execute(
    args: &CliArgs,
    board: &TaskBoard,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    board.start().await;
    match &args.command {
        Command::Setup => setup(args, board).await,
        Command::Signup(signup_args) => signup(args, board, signup_args, out).await,
        Command::Dashboard => {
            sign_in(args, board).await?;
            emit_view(args, board, out)
        }
        Command::Users(users) => {
            sign_in(args, board).await?;
            run_users(args, board, users, out).await
        }
        Command::Tasks(tasks) => {
            sign_in(args, board).await?;
            run_tasks(args, board, tasks, out).await
        }
    }
}

fn credentials(args: &CliArgs) -> Result<(&str, &str), CommandError> {
    match (args.email.as_deref(), args.password.as_deref()) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(CommandError::MissingCredentials),
    }
}

async fn sign_in(args: &CliArgs, board: &TaskBoard) -> Result<(), CommandError> {
    let (email, password) = credentials(args)?;
    if let Some(user) = board.session.current_user() {
        if user.email() == email.trim() {
            debug!(user_id = %user.id(), "reusing restored session");
            return Ok(());
        }
    }
    if !board.session.login(email, password).await {
        return Err(CommandError::LoginFailed);
    }
    board.refresh().await;
    Ok(())
}

async fn setup(args: &CliArgs, board: &TaskBoard) -> Result<(), CommandError> {
    let (email, password) = credentials(args)?;
    if board.users.bootstrap_manager(email, password).await {
        Ok(())
    } else {
        Err(CommandError::OperationFailed("setup"))
    }
}

async fn signup(
    args: &CliArgs,
    board: &TaskBoard,
    signup_args: &SignupArgs,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let (email, password) = credentials(args)?;
    flag_unknown_department(signup_args.department.as_deref());
    let form = NewUser::try_from_parts(
        &signup_args.name,
        email,
        password,
        signup_args.role,
        signup_args.department.as_deref(),
    )?;
    if !board.session.sign_up(&form).await {
        return Err(CommandError::OperationFailed("signup"));
    }
    board.refresh().await;
    emit_view(args, board, out)
}

fn emit_view(args: &CliArgs, board: &TaskBoard, out: &mut impl Write) -> Result<(), CommandError> {
    let view = board.view();
    if args.json {
        render::json(out, &view)?;
    } else {
        render::view(out, &view)?;
    }
    Ok(())
}

fn emit_users(args: &CliArgs, users: &[User], out: &mut impl Write) -> Result<(), CommandError> {
    if args.json {
        render::json(out, &users)?;
    } else {
        render::users(out, users)?;
    }
    Ok(())
}

fn emit_tasks(args: &CliArgs, tasks: &[Task], out: &mut impl Write) -> Result<(), CommandError> {
    if args.json {
        render::json(out, &tasks)?;
    } else {
        render::tasks(out, tasks)?;
    }
    Ok(())
}

async fn run_users(
    args: &CliArgs,
    board: &TaskBoard,
    command: &UsersCommand,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    match command {
        UsersCommand::List => emit_users(args, &board.users.all_users(), out),
        UsersCommand::Create(create) => {
            let form = new_user(create)?;
            if !board.users.create_user(&form).await {
                return Err(CommandError::OperationFailed("user creation"));
            }
            emit_users(args, &board.users.all_users(), out)
        }
    }
}

fn flag_unknown_department(department: Option<&str>) {
    if let Some(department) = department.map(str::trim) {
        if !department.is_empty() && !KNOWN_DEPARTMENTS.contains(&department) {
            warn!(department, "department outside the known list");
        }
    }
}

fn new_user(create: &CreateUserArgs) -> Result<NewUser, CommandError> {
    flag_unknown_department(create.department.as_deref());
    Ok(NewUser::try_from_parts(
        &create.name,
        &create.user_email,
        &create.user_password,
        create.role,
        create.department.as_deref(),
    )?)
}

async fn run_tasks(
    args: &CliArgs,
    board: &TaskBoard,
    command: &TasksCommand,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let acting = board.session.current_user();
    match command {
        TasksCommand::List(filters) => emit_tasks(args, &filtered(board, filters), out),
        TasksCommand::Add(add) => {
            let form = new_task(add)?;
            Dashboard::authorize(
                acting.as_ref(),
                TaskAction::Create {
                    assignee: form.assigned_to(),
                },
            )?;
            if !board.tasks.add_task(form).await {
                return Err(CommandError::OperationFailed("task creation"));
            }
            emit_tasks(args, &board.tasks.tasks(), out)
        }
        TasksCommand::Update(update) => {
            let patch = patch(update)?;
            let task = loaded_task(board, &update.id)?;
            Dashboard::authorize(acting.as_ref(), TaskAction::Edit(&task))?;
            if !board.tasks.update_task(&update.id, &patch).await {
                return Err(CommandError::OperationFailed("task update"));
            }
            emit_tasks(args, &board.tasks.tasks(), out)
        }
        TasksCommand::Complete { id } => {
            let task = loaded_task(board, id)?;
            Dashboard::authorize(acting.as_ref(), TaskAction::Complete(&task))?;
            if !board.tasks.complete_task(id).await {
                return Err(CommandError::OperationFailed("task completion"));
            }
            emit_tasks(args, &board.tasks.tasks(), out)
        }
    }
}

fn loaded_task(board: &TaskBoard, id: &TaskId) -> Result<Task, Error> {
    board
        .tasks
        .tasks()
        .into_iter()
        .find(|task| &task.id == id)
        .ok_or_else(|| Error::not_found(format!("Tarefa {id} não encontrada")))
}

fn filtered(board: &TaskBoard, filters: &ListTasksArgs) -> Vec<Task> {
    let mut tasks = match &filters.assignee {
        Some(assignee) => board.tasks.tasks_by_employee(assignee),
        None => board.tasks.tasks(),
    };
    if let Some(status) = filters.status {
        tasks.retain(|task| task.status == status);
    }
    tasks
}

fn new_task(add: &AddTaskArgs) -> Result<NewTask, CommandError> {
    Ok(NewTask::try_new(&add.title, add.assignee.clone())?
        .with_description(add.description.clone())
        .with_priority(add.priority)
        .with_due_date(add.due))
}

fn patch(update: &UpdateTaskArgs) -> Result<TaskPatch, CommandError> {
    if update.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(TaskValidationError::EmptyTitle.into());
    }
    let patch = TaskPatch {
        title: update.title.as_ref().map(|title| title.trim().to_owned()),
        description: update.description.clone(),
        status: update.status,
        priority: update.priority,
        due_date: update.due,
        completed_at: None,
    };
    if patch.is_empty() {
        return Err(CommandError::InvalidInput(
            "nothing to update: pass at least one field".to_owned(),
        ));
    }
    Ok(patch)
}
