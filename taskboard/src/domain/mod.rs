//! Domain primitives, stores and projections.
//!
//! Purpose: Define the strongly typed entities of the task board, the
//! stores that own in-memory state, and the pure dashboard projections.
//! Stores talk to the backend only through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure with a code.
//! - User, Role, NewUser: directory entities and the creation form.
//! - Task, NewTask, TaskPatch: task entities and mutations.
//! - SessionStore, UserDirectory, TaskStore: the stateful stores.
//! - route, ShellView: top-level view selection.

pub mod auth;
pub mod background;
pub mod dashboard;
pub mod error;
pub mod ports;
pub mod provisioning;
pub mod retry;
pub mod session;
pub mod shell;
pub mod task;
pub mod task_store;
pub mod user;
pub mod user_directory;

pub use self::auth::{
    AuthEvent, AuthIdentity, IssuedSession, LoginCredentials, LoginFailure, LoginValidationError,
    SignUpOutcome,
};
pub use self::background::ListenerGuard;
pub use self::dashboard::{Dashboard, TaskAction};
pub use self::error::{Error, ErrorCode};
pub use self::provisioning::{DEFAULT_SETTLE_DELAY, SignUpProvisioner};
pub use self::retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use self::session::{SessionFollower, SessionSnapshot, SessionStore};
pub use self::shell::{ShellView, route};
pub use self::task::{
    NewTask, Task, TaskId, TaskInsert, TaskPatch, TaskPriority, TaskStatus, TaskValidationError,
};
pub use self::task_store::TaskStore;
pub use self::user::{
    EmailAddress, KNOWN_DEPARTMENTS, NewUser, PASSWORD_MIN, ParseRoleError, Role, User, UserId,
    UserValidationError,
};
pub use self::user_directory::UserDirectory;
