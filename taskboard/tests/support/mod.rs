//! Shared harness for integration tests: a task board wired to the
//! in-memory backend with a controllable clock.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use taskboard::domain::{Role, Task, TaskId, TaskPriority, TaskStatus, User};
use taskboard::test_support::{InMemoryBackend, MutableClock, RecordingNotifier, RecordingSleeper};
use taskboard::wiring::{BoardPorts, TaskBoard};

pub const PASSWORD: &str = "segredo123";

/// Backend, doubles and the assembled board.
pub struct World {
    pub backend: Arc<InMemoryBackend>,
    pub clock: Arc<MutableClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub sleeper: Arc<RecordingSleeper>,
    pub board: TaskBoard,
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture time")
}

/// Build a world. Must be called inside a Tokio runtime.
pub fn world() -> World {
    let clock = Arc::new(MutableClock::new(epoch()));
    let backend = Arc::new(InMemoryBackend::new(clock.clone()));
    let notifier = Arc::new(RecordingNotifier::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let board = TaskBoard::assemble(BoardPorts::single_backend(
        backend.clone(),
        notifier.clone(),
        clock.clone(),
        sleeper.clone(),
    ));
    World {
        backend,
        clock,
        notifier,
        sleeper,
        board,
    }
}

/// A second board over the same backend, as another process would see it.
pub fn world_sharing(world: &World) -> TaskBoard {
    TaskBoard::assemble(BoardPorts::single_backend(
        world.backend.clone(),
        world.notifier.clone(),
        world.clock.clone(),
        world.sleeper.clone(),
    ))
}

impl World {
    /// Seed a confirmed account whose email is derived from `name`.
    pub fn seed(&self, name: &str, role: Role) -> User {
        let email = format!("{}@loja.com", name.to_lowercase());
        self.backend.seed_user(name, &email, PASSWORD, role)
    }

    /// Sign in as `user` and load roster and tasks.
    pub async fn sign_in(&self, user: &User) {
        assert!(
            self.board.session.login(user.email(), PASSWORD).await,
            "login as {} should succeed",
            user.email()
        );
        self.board.refresh().await;
    }
}

/// A stored task created `minutes_ago` before the epoch.
pub fn task(
    title: &str,
    assignee: &User,
    assigner: &User,
    status: TaskStatus,
    minutes_ago: i64,
) -> Task {
    let created = epoch() - TimeDelta::minutes(minutes_ago);
    Task {
        id: TaskId::random(),
        title: title.to_owned(),
        description: String::new(),
        assigned_to: assignee.id().clone(),
        assigned_by: assigner.id().clone(),
        status,
        priority: TaskPriority::Medium,
        created_at: created,
        updated_at: created,
        due_date: None,
        completed_at: None,
    }
}

/// Poll `check` until it holds or a second passes.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
