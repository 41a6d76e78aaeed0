//! Task data model.
//!
//! Statuses and priorities serialise with the values stored by the backend
//! (`pendente`, `em_andamento`, `concluida`; `baixa`, `media`, `alta`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// Validation errors for task inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// The id is not a UUID.
    InvalidId,
    /// The title is blank.
    EmptyTitle,
    /// The status is not one of the stored values.
    UnknownStatus(String),
    /// The priority is not one of the stored values.
    UnknownPriority(String),
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "task id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "task title is required"),
            Self::UnknownStatus(raw) => write!(f, "unknown task status: {raw}"),
            Self::UnknownPriority(raw) => write!(f, "unknown task priority: {raw}"),
        }
    }
}

impl std::error::Error for TaskValidationError {}

/// Backend-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Wrap a parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| TaskValidationError::InvalidId)
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[serde(rename = "pendente")]
    Pending,
    /// Being worked on.
    #[serde(rename = "em_andamento")]
    InProgress,
    /// Finished.
    #[serde(rename = "concluida")]
    Done,
}

impl TaskStatus {
    /// Stored value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendente",
            Self::InProgress => "em_andamento",
            Self::Done => "concluida",
        }
    }

    /// Badge label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::InProgress => "Em Andamento",
            Self::Done => "Concluída",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pendente" => Ok(Self::Pending),
            "em_andamento" => Ok(Self::InProgress),
            "concluida" => Ok(Self::Done),
            other => Err(TaskValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Low urgency.
    #[serde(rename = "baixa")]
    Low,
    /// Default urgency.
    #[default]
    #[serde(rename = "media")]
    Medium,
    /// Needs attention first.
    #[serde(rename = "alta")]
    High,
}

impl TaskPriority {
    /// Stored value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "baixa",
            Self::Medium => "media",
            Self::High => "alta",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "baixa" => Ok(Self::Low),
            "media" => Ok(Self::Medium),
            "alta" => Ok(Self::High),
            other => Err(TaskValidationError::UnknownPriority(other.to_owned())),
        }
    }
}

/// A task as held in memory.
///
/// `completed_at` is expected to be set exactly when `status` is
/// [`TaskStatus::Done`]; only [`TaskPatch::completion`] maintains that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Backend-assigned id.
    pub id: TaskId,
    /// Short summary.
    pub title: String,
    /// Free-text details; may be empty.
    pub description: String,
    /// User doing the work.
    pub assigned_to: UserId,
    /// User who created the task.
    pub assigned_by: UserId,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Server-set creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Optional deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Set when the task is completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Merge a patch into this task and stamp `updated_at`.
    pub fn apply(&mut self, patch: &TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = Some(completed_at);
        }
        self.updated_at = now;
    }
}

/// Task creation form, before the assigner is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
    assigned_to: UserId,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Validate the required fields; optional ones take their defaults.
    ///
    /// # Examples
    /// ```
    /// use taskboard::domain::{NewTask, TaskPriority, TaskStatus, UserId};
    ///
    /// let task = NewTask::try_new("Organizar vitrine", UserId::random())
    ///     .unwrap()
    ///     .with_priority(TaskPriority::High);
    /// assert_eq!(task.status(), TaskStatus::Pending);
    /// ```
    pub fn try_new(title: &str, assigned_to: UserId) -> Result<Self, TaskValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_owned(),
            description: String::new(),
            assigned_to,
            status: TaskStatus::Pending,
            priority: TaskPriority::default(),
            due_date: None,
        })
    }

    /// Set the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the initial status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Assignee.
    pub fn assigned_to(&self) -> &UserId {
        &self.assigned_to
    }

    /// Initial status.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Priority.
    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Due date.
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Stamp the acting user as the assigner.
    pub fn assigned_by(self, assigned_by: UserId) -> TaskInsert {
        TaskInsert {
            task: self,
            assigned_by,
        }
    }
}

/// Row sent to the task repository on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInsert {
    /// Validated form values.
    pub task: NewTask,
    /// The acting user.
    pub assigned_by: UserId,
}

/// Sparse task update; only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New deadline.
    pub due_date: Option<DateTime<Utc>>,
    /// Completion time; set by [`TaskPatch::completion`].
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Patch that marks a task done at `now`.
    pub fn completion(now: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::Done),
            completed_at: Some(now),
            ..Self::default()
        }
    }

    /// Patch that only changes the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.completed_at.is_none()
    }
}
