//! Port abstraction for the `tasks` table and its errors.
use async_trait::async_trait;

use crate::domain::{Task, TaskId, TaskInsert, TaskPatch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by task repository adapters.
    pub enum TaskRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "task repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "task repository query failed: {message}",
        /// A stored row could not be mapped to a task.
        Decode { message: String } => "task row could not be decoded: {message}",
    }
}

/// Task persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, newest `created_at` first.
    async fn list_recent_first(&self) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Insert a task and return the stored row with server-assigned fields.
    async fn insert(&self, task: &TaskInsert) -> Result<Task, TaskRepositoryError>;

    /// Write only the fields present in `patch`.
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), TaskRepositoryError>;
}
