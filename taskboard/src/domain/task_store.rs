//! Task store: the in-memory task list and its mutations.
//!
//! New tasks are prepended as returned by the server, so until the next
//! reload the list order reflects local insertion rather than
//! `created_at`. Local updates stamp `updated_at` from the injected clock;
//! the server's own timestamp only arrives with the next reload.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info, warn};

use crate::domain::background::ListenerGuard;
use crate::domain::ports::{Notice, Notifier, TaskRepository};
use crate::domain::session::{SessionFollower, SessionStore, follow_session};
use crate::domain::{NewTask, Task, TaskId, TaskPatch, TaskStatus, User, UserId};

/// In-memory task list backed by the task repository.
pub struct TaskStore {
    session: Arc<SessionStore>,
    repository: Arc<dyn TaskRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock + Send + Sync>,
    tasks: RwLock<Vec<Task>>,
}

impl TaskStore {
    /// Build an empty store.
    pub fn new(
        session: Arc<SessionStore>,
        repository: Arc<dyn TaskRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            session,
            repository,
            notifier,
            clock,
            tasks: RwLock::new(Vec::new()),
        }
    }

    /// Replace the list with all tasks, newest first.
    ///
    /// Does nothing without a signed-in user.
    pub async fn load_tasks(&self) -> bool {
        if self.session.current_user().is_none() {
            debug!("skipping task load without a session");
            return false;
        }
        match self.repository.list_recent_first().await {
            Ok(tasks) => {
                info!(count = tasks.len(), "tasks loaded");
                *self.write_tasks() = tasks;
                true
            }
            Err(err) => {
                error!(error = %err, "failed to load tasks");
                self.notifier
                    .notify(Notice::destructive("Erro", "Erro ao carregar tarefas"));
                false
            }
        }
    }

    /// Create a task assigned by the signed-in user and prepend it.
    pub async fn add_task(&self, task: NewTask) -> bool {
        let Some(acting) = self.session.current_user() else {
            warn!("task creation attempted without a session");
            return false;
        };

        let insert = task.assigned_by(acting.id().clone());
        match self.repository.insert(&insert).await {
            Ok(stored) => {
                info!(task_id = %stored.id, assigned_to = %stored.assigned_to, "task created");
                self.write_tasks().insert(0, stored);
                true
            }
            Err(err) => {
                error!(error = %err, "failed to create task");
                self.notifier
                    .notify(Notice::destructive("Erro", "Erro ao criar tarefa"));
                false
            }
        }
    }

    /// Write a sparse patch and merge it into the local copy.
    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> bool {
        if let Err(err) = self.repository.update(id, patch).await {
            error!(error = %err, task_id = %id, "failed to update task");
            self.notifier
                .notify(Notice::destructive("Erro", "Erro ao atualizar tarefa"));
            return false;
        }

        let now = self.clock.utc();
        let mut tasks = self.write_tasks();
        match tasks.iter_mut().find(|task| &task.id == id) {
            Some(task) => task.apply(patch, now),
            None => debug!(task_id = %id, "updated task is not loaded locally"),
        }
        true
    }

    /// Mark a task done now.
    pub async fn complete_task(&self, id: &TaskId) -> bool {
        let patch = TaskPatch::completion(self.clock.utc());
        self.update_task(id, &patch).await
    }

    /// Tasks assigned to `employee`.
    pub fn tasks_by_employee(&self, employee: &UserId) -> Vec<Task> {
        self.read_tasks()
            .iter()
            .filter(|task| &task.assigned_to == employee)
            .cloned()
            .collect()
    }

    /// Tasks in `status`.
    pub fn tasks_by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.read_tasks()
            .iter()
            .filter(|task| task.status == status)
            .cloned()
            .collect()
    }

    /// Snapshot of the list in its current order.
    pub fn tasks(&self) -> Vec<Task> {
        self.read_tasks().clone()
    }

    /// Reload on sign-in and clear on sign-out.
    pub fn follow_session(self: &Arc<Self>) -> ListenerGuard {
        follow_session(&self.session, self)
    }

    fn read_tasks(&self) -> RwLockReadGuard<'_, Vec<Task>> {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tasks(&self) -> RwLockWriteGuard<'_, Vec<Task>> {
        self.tasks.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionFollower for TaskStore {
    async fn session_user_changed(&self, user: Option<User>) {
        if user.is_some() {
            self.load_tasks().await;
        } else {
            self.write_tasks().clear();
        }
    }
}

#[cfg(test)]
mod tests;
