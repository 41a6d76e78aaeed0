//! Session, bootstrap and account-creation flows against the in-memory
//! backend.

mod support;

use std::time::Duration;

use rstest::rstest;
use taskboard::domain::{AuthEvent, Dashboard, NewUser, Role, ShellView, TaskStatus};

use support::{PASSWORD, eventually, task, world, world_sharing};

fn employee_form(name: &str, email: &str) -> NewUser {
    NewUser::try_from_parts(name, email, PASSWORD, Role::Employee, Some("Vendas"))
        .expect("valid form")
}

#[rstest]
#[tokio::test]
async fn bootstrap_creates_the_first_manager_without_a_session() {
    let world = world();
    world.board.start().await;
    assert_eq!(world.board.view(), ShellView::InitialSetup);

    assert!(
        world
            .board
            .users
            .bootstrap_manager("gerente@loja.com", PASSWORD)
            .await
    );

    assert_eq!(world.backend.sign_up_calls(), 1);
    assert_eq!(world.backend.revoked_sessions(), 1);
    assert!(world.backend.active_identity().is_none());
    assert!(world.board.users.has_manager());
    assert_eq!(world.board.view(), ShellView::Login);
    assert!(world.notifier.titles().contains(&"Gerente criado!".to_owned()));

    assert!(world.board.session.login("gerente@loja.com", PASSWORD).await);
    world.board.refresh().await;
    assert!(matches!(
        world.board.view(),
        ShellView::Dashboard(Dashboard::Manager(_))
    ));
}

#[rstest]
#[tokio::test]
async fn bootstrap_is_refused_once_a_manager_exists() {
    let world = world();
    world.seed("Marta", Role::Manager);
    world.board.start().await;

    assert!(
        !world
            .board
            .users
            .bootstrap_manager("outro@loja.com", PASSWORD)
            .await
    );
    assert_eq!(world.backend.sign_up_calls(), 0);
    assert!(world
        .notifier
        .titles()
        .contains(&"Configuração já realizada".to_owned()));
}

#[rstest]
#[tokio::test]
async fn manager_creation_keeps_the_acting_session() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    world.sign_in(&manager).await;

    assert!(
        world
            .board
            .users
            .create_user(&employee_form("Ana", "ana@loja.com"))
            .await
    );

    let active = world.backend.active_identity().expect("session still active");
    assert_eq!(&active.user_id, manager.id());
    assert_eq!(world.board.session.current_user().as_ref(), Some(&manager));
    assert_eq!(world.backend.revoked_sessions(), 1);
    assert!(world
        .board
        .users
        .all_users()
        .iter()
        .any(|user| user.email() == "ana@loja.com"));
}

#[rstest]
#[tokio::test]
async fn duplicate_email_never_reaches_sign_up() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    world.seed("Ana", Role::Employee);
    world.sign_in(&manager).await;
    let roster = world.board.users.all_users();

    assert!(
        !world
            .board
            .users
            .create_user(&employee_form("Outra Ana", "ANA@loja.com"))
            .await
    );

    assert_eq!(world.backend.sign_up_calls(), 0);
    assert_eq!(world.board.users.all_users(), roster);
    let last = world.notifier.notices().pop().expect("failure notice");
    assert_eq!(last.description, "Já existe um usuário com este email");
}

#[rstest]
#[case(Role::Employee)]
#[case(Role::Supervisor)]
#[tokio::test]
async fn only_managers_create_accounts(#[case] role: Role) {
    let world = world();
    world.seed("Marta", Role::Manager);
    let acting = world.seed("Bruno", role);
    world.sign_in(&acting).await;
    let roster = world.board.users.all_users();

    assert!(
        !world
            .board
            .users
            .create_user(&employee_form("Ana", "ana@loja.com"))
            .await
    );

    assert_eq!(world.backend.sign_up_calls(), 0);
    assert_eq!(world.board.users.all_users(), roster);
    assert_eq!(world.notifier.titles().last().map(String::as_str), Some("Acesso negado"));
}

#[rstest]
#[tokio::test]
async fn profile_lag_is_bridged_by_retries() {
    let world = world();
    world.backend.set_profile_lag(2);

    assert!(
        world
            .board
            .session
            .sign_up(&employee_form("Ana", "ana@loja.com"))
            .await
    );

    let user = world.board.session.current_user().expect("profile resolved");
    assert_eq!(user.email(), "ana@loja.com");
    assert_eq!(world.backend.profile_lookups(), 3);
    assert_eq!(
        world.sleeper.recorded(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
    assert!(!world.board.session.is_loading());
}

#[rstest]
#[tokio::test]
async fn unconfirmed_sign_up_leaves_nobody_signed_in() {
    let world = world();
    world.backend.require_email_confirmation(true);

    assert!(
        world
            .board
            .session
            .sign_up(&employee_form("Ana", "ana@loja.com"))
            .await
    );
    assert!(world.board.session.current_user().is_none());
    assert!(!world.board.session.login("ana@loja.com", PASSWORD).await);
    assert_eq!(
        world.notifier.titles().last().map(String::as_str),
        Some("Email não confirmado")
    );
}

#[rstest]
#[tokio::test]
async fn wrong_password_is_reported_as_invalid_credentials() {
    let world = world();
    let ana = world.seed("Ana", Role::Employee);

    assert!(!world.board.session.login(ana.email(), "errada").await);
    assert!(world.board.session.current_user().is_none());
    assert_eq!(
        world.notifier.titles().last().map(String::as_str),
        Some("Credenciais inválidas")
    );
}

#[rstest]
#[tokio::test]
async fn restored_session_skips_login() {
    let world = world();
    let ana = world.seed("Ana", Role::Employee);
    world.sign_in(&ana).await;

    let second = world_sharing(&world);
    second.start().await;

    assert_eq!(second.session.current_user().as_ref(), Some(&ana));
    assert!(matches!(
        second.view(),
        ShellView::Dashboard(Dashboard::Employee(_))
    ));
}

#[rstest]
#[tokio::test]
async fn external_sign_out_clears_session_and_tasks() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    let ana = world.seed("Ana", Role::Employee);
    world
        .backend
        .seed_task(task("Repor gôndola", &ana, &manager, TaskStatus::Pending, 5));
    world.sign_in(&ana).await;
    assert_eq!(world.board.tasks.tasks().len(), 1);

    world.backend.emit(AuthEvent::SignedOut);

    let board = &world.board;
    assert!(eventually(|| board.session.current_user().is_none()).await);
    assert!(eventually(|| board.tasks.tasks().is_empty()).await);
}

#[rstest]
#[tokio::test]
async fn logout_clears_the_user_tasks_and_shows_login() {
    let world = world();
    let manager = world.seed("Marta", Role::Manager);
    let ana = world.seed("Ana", Role::Employee);
    world
        .backend
        .seed_task(task("Repor gôndola", &ana, &manager, TaskStatus::Pending, 5));
    world.sign_in(&ana).await;
    assert_eq!(world.board.tasks.tasks().len(), 1);

    world.board.session.logout().await;

    assert!(world.board.session.current_user().is_none());
    assert!(world.backend.active_identity().is_none());
    assert_eq!(world.board.view(), ShellView::Login);
    let board = &world.board;
    assert!(eventually(|| board.tasks.tasks().is_empty()).await);
}
