//! Regression coverage for the task store.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockTaskRepository, SilentNotifier, TaskRepositoryError};
use crate::domain::{Role, TaskPriority};
use crate::test_support::{InMemoryBackend, MutableClock, RecordingNotifier};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

struct Harness {
    store: TaskStore,
    clock: Arc<MutableClock>,
    notifier: Arc<RecordingNotifier>,
    acting: Option<User>,
}

async fn harness(repository: MockTaskRepository, signed_in: bool) -> Harness {
    let clock = Arc::new(MutableClock::new(at(8)));
    let backend = Arc::new(InMemoryBackend::new(clock.clone()));
    let acting = backend.seed_user("Sofia", "sofia@loja.com", "segredo", Role::Supervisor);
    let session = Arc::new(SessionStore::new(
        backend.clone(),
        backend,
        Arc::new(SilentNotifier),
    ));
    if signed_in {
        assert!(session.login("sofia@loja.com", "segredo").await);
    }
    let notifier = Arc::new(RecordingNotifier::default());
    let store = TaskStore::new(session, Arc::new(repository), notifier.clone(), clock.clone());
    Harness {
        store,
        clock,
        notifier,
        acting: signed_in.then_some(acting),
    }
}

fn stored(assigned_by: &UserId, status: TaskStatus) -> Task {
    Task {
        id: TaskId::random(),
        title: "Repor prateleira".to_owned(),
        description: String::new(),
        assigned_to: UserId::random(),
        assigned_by: assigned_by.clone(),
        status,
        priority: TaskPriority::Medium,
        created_at: at(7),
        updated_at: at(7),
        due_date: None,
        completed_at: None,
    }
}

fn loaded(task: Task) -> MockTaskRepository {
    let mut repository = MockTaskRepository::new();
    repository
        .expect_list_recent_first()
        .return_once(move || Ok(vec![task]));
    repository
}

#[rstest]
#[tokio::test]
async fn new_task_is_assigned_by_acting_user_and_prepended() {
    let mut repository = MockTaskRepository::new();
    let existing = stored(&UserId::random(), TaskStatus::Pending);
    let existing_id = existing.id;
    repository
        .expect_list_recent_first()
        .return_once(move || Ok(vec![existing]));
    repository.expect_insert().times(1).returning(|insert| {
        let mut task = stored(&insert.assigned_by, insert.task.status());
        task.title = insert.task.title().to_owned();
        Ok(task)
    });

    let h = harness(repository, true).await;
    let acting = h.acting.clone().expect("signed in");
    assert!(h.store.load_tasks().await);

    let form = NewTask::try_new("Organizar vitrine", UserId::random()).expect("valid task");
    assert!(h.store.add_task(form).await);

    let tasks = h.store.tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Organizar vitrine");
    assert_eq!(&tasks[0].assigned_by, acting.id());
    assert_eq!(tasks[1].id, existing_id);
}

#[rstest]
#[tokio::test]
async fn adding_without_session_is_refused() {
    let mut repository = MockTaskRepository::new();
    repository.expect_insert().never();
    repository.expect_list_recent_first().never();

    let h = harness(repository, false).await;
    let form = NewTask::try_new("Organizar vitrine", UserId::random()).expect("valid task");

    assert!(!h.store.add_task(form).await);
    assert!(!h.store.load_tasks().await);
}

#[rstest]
#[tokio::test]
async fn moving_to_in_progress_stamps_updated_at_only() {
    let task = stored(&UserId::random(), TaskStatus::Pending);
    let id = task.id;
    let mut repository = loaded(task);
    repository
        .expect_update()
        .withf(|_, patch| patch.status == Some(TaskStatus::InProgress) && patch.completed_at.is_none())
        .times(1)
        .returning(|_, _| Ok(()));

    let h = harness(repository, true).await;
    h.store.load_tasks().await;
    h.clock.set(at(9));

    assert!(
        h.store
            .update_task(&id, &TaskPatch::status(TaskStatus::InProgress))
            .await
    );

    let task = &h.store.tasks()[0];
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.updated_at, at(9));
    assert!(task.updated_at > task.created_at);
    assert_eq!(task.completed_at, None);
}

#[rstest]
#[tokio::test]
async fn completing_twice_stays_done() {
    let task = stored(&UserId::random(), TaskStatus::InProgress);
    let id = task.id;
    let mut repository = loaded(task);
    repository
        .expect_update()
        .times(2)
        .returning(|_, _| Ok(()));

    let h = harness(repository, true).await;
    h.store.load_tasks().await;
    h.clock.set(at(10));
    assert!(h.store.complete_task(&id).await);
    h.clock.set(at(11));
    assert!(h.store.complete_task(&id).await);

    let task = &h.store.tasks()[0];
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.completed_at, Some(at(11)));
    assert_eq!(h.store.tasks_by_status(TaskStatus::Done).len(), 1);
}

#[rstest]
#[tokio::test]
async fn failed_update_leaves_memory_untouched() {
    let task = stored(&UserId::random(), TaskStatus::Pending);
    let id = task.id;
    let before = task.clone();
    let mut repository = loaded(task);
    repository
        .expect_update()
        .returning(|_, _| Err(TaskRepositoryError::query("row level security")));

    let h = harness(repository, true).await;
    h.store.load_tasks().await;

    assert!(!h.store.complete_task(&id).await);
    assert_eq!(h.store.tasks(), vec![before]);
    assert_eq!(h.notifier.titles(), vec!["Erro".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn filters_by_employee_and_status() {
    let task = stored(&UserId::random(), TaskStatus::Pending);
    let assignee = task.assigned_to.clone();
    let h = harness(loaded(task), true).await;
    h.store.load_tasks().await;

    assert_eq!(h.store.tasks_by_employee(&assignee).len(), 1);
    assert!(h.store.tasks_by_employee(&UserId::random()).is_empty());
    assert_eq!(h.store.tasks_by_status(TaskStatus::Pending).len(), 1);
    assert!(h.store.tasks_by_status(TaskStatus::Done).is_empty());
}
