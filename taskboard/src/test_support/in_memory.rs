//! In-memory stand-in for the hosted backend.
//!
//! One value implements the auth, profile and task ports over shared state,
//! including the trigger that derives a profile from sign-up metadata. The
//! trigger can lag behind the account so retry paths are reachable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::broadcast;

use crate::domain::ports::{
    AuthGateway, AuthGatewayError, ProfileRepository, ProfileRepositoryError, TaskRepository,
    TaskRepositoryError,
};
use crate::domain::{
    AuthEvent, AuthIdentity, EmailAddress, IssuedSession, LoginCredentials, NewUser, Role,
    SignUpOutcome, Task, TaskId, TaskInsert, TaskPatch, User, UserId,
};

struct Account {
    identity: AuthIdentity,
    password: String,
    confirmed: bool,
}

#[derive(Default)]
struct Calls {
    sign_up: usize,
    revoked: usize,
    profile_lookups: usize,
}

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    profiles: Vec<User>,
    hidden_lookups: HashMap<UserId, u32>,
    tasks: Vec<Task>,
    active: Option<AuthIdentity>,
    profile_lag: u32,
    require_confirmation: bool,
    fail_profile_reads: bool,
    fail_task_writes: bool,
    calls: Calls,
}

/// Backend double implementing every data and auth port.
pub struct InMemoryBackend {
    state: Mutex<State>,
    events: broadcast::Sender<AuthEvent>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryBackend {
    /// Empty backend stamping server times from `clock`.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(State::default()),
            events,
            clock,
        }
    }

    /// Create a confirmed account with a visible profile.
    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) -> User {
        let id = UserId::random();
        let user = User::try_new(id.clone(), name, email, role, None)
            .unwrap_or_else(|err| panic!("seed user {name}: {err}"));
        let mut state = self.lock();
        state.accounts.push(Account {
            identity: AuthIdentity {
                user_id: id,
                email: Some(email.to_owned()),
            },
            password: password.to_owned(),
            confirmed: true,
        });
        state.profiles.push(user.clone());
        user
    }

    /// Store a task as if inserted earlier.
    pub fn seed_task(&self, task: Task) {
        self.lock().tasks.push(task);
    }

    /// Hide new profiles from the next `lookups` id lookups each.
    pub fn set_profile_lag(&self, lookups: u32) {
        self.lock().profile_lag = lookups;
    }

    /// Require email confirmation: sign-up issues no session and sign-in fails.
    pub fn require_email_confirmation(&self, required: bool) {
        self.lock().require_confirmation = required;
    }

    /// Make every profile read fail.
    pub fn fail_profile_reads(&self, fail: bool) {
        self.lock().fail_profile_reads = fail;
    }

    /// Make task inserts and updates fail.
    pub fn fail_task_writes(&self, fail: bool) {
        self.lock().fail_task_writes = fail;
    }

    /// Number of sign-up calls received.
    pub fn sign_up_calls(&self) -> usize {
        self.lock().calls.sign_up
    }

    /// Number of sessions revoked.
    pub fn revoked_sessions(&self) -> usize {
        self.lock().calls.revoked
    }

    /// Number of profile lookups by id.
    pub fn profile_lookups(&self) -> usize {
        self.lock().calls.profile_lookups
    }

    /// Identity of the active session.
    pub fn active_identity(&self) -> Option<AuthIdentity> {
        self.lock().active.clone()
    }

    /// Stored tasks in insertion order.
    pub fn stored_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Broadcast an auth event as the hosted service would.
    pub fn emit(&self, event: AuthEvent) {
        // Nobody listening is fine.
        if self.events.send(event).is_err() {
            tracing::debug!("auth event dropped without subscribers");
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthIdentity, AuthGatewayError> {
        let identity = {
            let mut state = self.lock();
            let account = state
                .accounts
                .iter()
                .find(|account| {
                    account
                        .identity
                        .email
                        .as_deref()
                        .is_some_and(|email| email.eq_ignore_ascii_case(credentials.email()))
                        && account.password == credentials.password()
                })
                .ok_or(AuthGatewayError::InvalidCredentials)?;
            if !account.confirmed {
                return Err(AuthGatewayError::EmailNotConfirmed);
            }
            let identity = account.identity.clone();
            state.active = Some(identity.clone());
            identity
        };
        self.emit(AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, form: &NewUser) -> Result<SignUpOutcome, AuthGatewayError> {
        let mut state = self.lock();
        state.calls.sign_up += 1;
        let taken = state.accounts.iter().any(|account| {
            account
                .identity
                .email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(form.email().as_ref()))
        });
        if taken {
            return Err(AuthGatewayError::rejected("User already registered"));
        }

        let identity = AuthIdentity {
            user_id: UserId::random(),
            email: Some(form.email().to_string()),
        };
        let profile = User::try_new(
            identity.user_id.clone(),
            form.name(),
            form.email().as_ref(),
            form.role(),
            form.department().map(str::to_owned),
        )
        .map_err(|err| AuthGatewayError::rejected(err.to_string()))?;

        let lag = state.profile_lag;
        if lag > 0 {
            state.hidden_lookups.insert(identity.user_id.clone(), lag);
        }
        state.profiles.push(profile);
        let confirmed = !state.require_confirmation;
        state.accounts.push(Account {
            identity: identity.clone(),
            password: form.password().to_owned(),
            confirmed,
        });

        let session = confirmed
            .then(|| IssuedSession::new(identity.clone(), format!("token-{}", identity.user_id)));
        Ok(SignUpOutcome { identity, session })
    }

    async fn adopt_session(&self, session: IssuedSession) -> Result<(), AuthGatewayError> {
        let identity = session.identity().clone();
        self.lock().active = Some(identity.clone());
        self.emit(AuthEvent::SignedIn(identity));
        Ok(())
    }

    async fn revoke_session(&self, _session: &IssuedSession) -> Result<(), AuthGatewayError> {
        self.lock().calls.revoked += 1;
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthGatewayError> {
        self.lock().active = None;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthIdentity>, AuthGatewayError> {
        Ok(self.lock().active.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryBackend {
    async fn list_ordered_by_name(&self) -> Result<Vec<User>, ProfileRepositoryError> {
        let state = self.lock();
        if state.fail_profile_reads {
            return Err(ProfileRepositoryError::query("profiles unavailable"));
        }
        let mut users: Vec<User> = state
            .profiles
            .iter()
            .filter(|user| !state.hidden_lookups.contains_key(user.id()))
            .cloned()
            .collect();
        users.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(users)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, ProfileRepositoryError> {
        let mut state = self.lock();
        state.calls.profile_lookups += 1;
        if state.fail_profile_reads {
            return Err(ProfileRepositoryError::query("profiles unavailable"));
        }
        if let Some(remaining) = state.hidden_lookups.get_mut(id) {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                state.hidden_lookups.remove(id);
            }
            return Ok(None);
        }
        Ok(state.profiles.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, ProfileRepositoryError> {
        let state = self.lock();
        if state.fail_profile_reads {
            return Err(ProfileRepositoryError::query("profiles unavailable"));
        }
        Ok(state
            .profiles
            .iter()
            .find(|user| user.email().eq_ignore_ascii_case(email.as_ref()))
            .cloned())
    }
}

#[async_trait]
impl TaskRepository for InMemoryBackend {
    async fn list_recent_first(&self) -> Result<Vec<Task>, TaskRepositoryError> {
        let mut tasks = self.lock().tasks.clone();
        tasks.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(tasks)
    }

    async fn insert(&self, insert: &TaskInsert) -> Result<Task, TaskRepositoryError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        if state.fail_task_writes {
            return Err(TaskRepositoryError::query("insert rejected"));
        }
        let form = &insert.task;
        let task = Task {
            id: TaskId::random(),
            title: form.title().to_owned(),
            description: form.description().to_owned(),
            assigned_to: form.assigned_to().clone(),
            assigned_by: insert.assigned_by.clone(),
            status: form.status(),
            priority: form.priority(),
            created_at: now,
            updated_at: now,
            due_date: form.due_date(),
            completed_at: None,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), TaskRepositoryError> {
        let now = self.clock.utc();
        let mut state = self.lock();
        if state.fail_task_writes {
            return Err(TaskRepositoryError::query("update rejected"));
        }
        if let Some(task) = state.tasks.iter_mut().find(|task| &task.id == id) {
            task.apply(patch, now);
        }
        Ok(())
    }
}
