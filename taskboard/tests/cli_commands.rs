//! CLI commands executed against an in-memory board.

mod support;

use clap::Parser;
use env_lock::lock_env;
use rstest::rstest;
use serde_json::Value;
use taskboard::domain::{ErrorCode, Role, TaskStatus};
use taskboard::inbound::cli::{CliArgs, CommandError, execute};

use support::{PASSWORD, World, task, world};

async fn run(world: &World, argv: &[&str]) -> Result<String, CommandError> {
    let args = CliArgs::try_parse_from(argv).expect("arguments parse");
    let mut out = Vec::new();
    execute(&args, &world.board, &mut out).await?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

#[rstest]
#[tokio::test]
async fn dashboard_json_reports_the_manager_view() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    let ana = world.seed("Ana", Role::Employee);
    world
        .backend
        .seed_task(task("Repor gôndola", &ana, &manager, TaskStatus::Done, 5));

    let output = run(
        &world,
        &[
            "taskboard",
            "--json",
            "--email",
            manager.email(),
            "--password",
            PASSWORD,
            "dashboard",
        ],
    )
    .await
    .expect("dashboard renders");

    let value: Value = serde_json::from_str(&output).expect("valid json");
    assert_eq!(value["view"], "dashboard");
    assert_eq!(value["dashboard"]["role"], "manager");
    assert_eq!(value["dashboard"]["completionRate"], 100);
}

#[rstest]
#[tokio::test]
async fn setup_then_task_assignment() {
    let world = world();
    let ana = world.seed("Ana", Role::Employee);
    // Only employees exist, so the first manager may still be created.
    run(
        &world,
        &[
            "taskboard",
            "--email",
            "gerente@loja.com",
            "--password",
            PASSWORD,
            "setup",
        ],
    )
    .await
    .expect("setup succeeds");

    let assignee = ana.id().to_string();
    let output = run(
        &world,
        &[
            "taskboard",
            "--email",
            "gerente@loja.com",
            "--password",
            PASSWORD,
            "tasks",
            "add",
            "--title",
            "Conferir validade",
            "--assignee",
            &assignee,
            "--priority",
            "alta",
            "--due",
            "2024-03-05",
        ],
    )
    .await
    .expect("task added");

    assert!(output.contains("Conferir validade"));
    let stored = world.backend.stored_tasks();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored.first().map(|task| task.assigned_to.clone()),
        Some(ana.id().clone())
    );
}

#[rstest]
#[tokio::test]
async fn commands_need_credentials() {
    let world = world();
    world.seed("Marta", Role::Manager);

    let args = {
        let _guard = lock_env([
            ("TASKBOARD_EMAIL", None::<String>),
            ("TASKBOARD_PASSWORD", None::<String>),
        ]);
        CliArgs::try_parse_from(["taskboard", "users", "list"]).expect("arguments parse")
    };
    let mut out = Vec::new();
    assert!(matches!(
        execute(&args, &world.board, &mut out).await,
        Err(CommandError::MissingCredentials)
    ));
}

#[rstest]
#[tokio::test]
async fn failed_login_is_an_error() {
    let world = world();
    let ana = world.seed("Ana", Role::Employee);

    let result = run(
        &world,
        &[
            "taskboard",
            "--email",
            ana.email(),
            "--password",
            "errada",
            "tasks",
            "list",
        ],
    )
    .await;

    assert!(matches!(result, Err(CommandError::LoginFailed)));
}

fn acting_as<'a>(email: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    let mut argv = vec!["taskboard", "--email", email, "--password", PASSWORD];
    argv.extend_from_slice(rest);
    argv
}

#[rstest]
#[tokio::test]
async fn employees_cannot_create_tasks() {
    let world = world();
    world.seed("Marta", Role::Manager);
    let ana = world.seed("Ana", Role::Employee);
    let own_id = ana.id().to_string();

    let result = run(
        &world,
        &acting_as(
            ana.email(),
            &["tasks", "add", "--title", "Folga", "--assignee", &own_id],
        ),
    )
    .await;

    assert!(matches!(
        result,
        Err(CommandError::Refused(ref error)) if error.code() == ErrorCode::Forbidden
    ));
    assert!(world.backend.stored_tasks().is_empty());
}

#[rstest]
#[tokio::test]
async fn employees_cannot_touch_tasks_of_others() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    let ana = world.seed("Ana", Role::Employee);
    let bia = world.seed("Bia", Role::Employee);
    let theirs = task("Repor gôndola", &bia, &manager, TaskStatus::Pending, 5);
    let id = theirs.id.to_string();
    world.backend.seed_task(theirs);

    for rest in [
        vec!["tasks", "complete", id.as_str()],
        vec!["tasks", "update", id.as_str(), "--status", "em_andamento"],
    ] {
        let result = run(&world, &acting_as(ana.email(), &rest)).await;
        assert!(
            matches!(
                result,
                Err(CommandError::Refused(ref error)) if error.code() == ErrorCode::Forbidden
            ),
            "{rest:?}"
        );
    }

    let stored = world.backend.stored_tasks();
    assert_eq!(
        stored.first().map(|task| task.status),
        Some(TaskStatus::Pending)
    );
}

#[rstest]
#[tokio::test]
async fn employees_complete_their_own_tasks() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    let ana = world.seed("Ana", Role::Employee);
    let own = task("Repor gôndola", &ana, &manager, TaskStatus::Pending, 5);
    let id = own.id.to_string();
    world.backend.seed_task(own);

    run(&world, &acting_as(ana.email(), &["tasks", "complete", &id]))
        .await
        .expect("own task completes");

    let stored = world.backend.stored_tasks();
    assert_eq!(stored.first().map(|task| task.status), Some(TaskStatus::Done));
}

#[rstest]
#[tokio::test]
async fn unknown_task_is_reported_as_not_found() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);

    let result = run(
        &world,
        &acting_as(
            manager.email(),
            &["tasks", "complete", "5f8d0d55-0000-4000-8000-000000000001"],
        ),
    )
    .await;

    assert!(matches!(
        result,
        Err(CommandError::Refused(ref error)) if error.code() == ErrorCode::NotFound
    ));
}
