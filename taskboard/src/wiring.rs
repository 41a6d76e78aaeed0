//! Assembly of stores, adapters and background listeners.
//!
//! [`BoardPorts`] collects every outbound dependency so tests can swap the
//! Supabase adapters for in-memory doubles; [`TaskBoard::assemble`] builds
//! the stores and starts their listeners.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tracing::info;

use crate::config::{AppSettings, SettingsError};
use crate::domain::ports::{
    AccountProvisioner, AuthGateway, Notifier, ProfileRepository, TaskRepository,
};
use crate::domain::{
    ListenerGuard, RetryPolicy, SessionStore, ShellView, SignUpProvisioner, Sleeper, TaskStore,
    TokioSleeper, UserDirectory, route,
};
use crate::outbound::notifications::TracingNotifier;
use crate::outbound::supabase::{
    SupabaseAdminProvisioner, SupabaseAuth, SupabaseClient, SupabaseProfiles, SupabaseTasks,
};

/// Start-up failures.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    /// Settings were incomplete or malformed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outbound dependencies of the stores.
pub struct BoardPorts {
    /// Auth service.
    pub auth: Arc<dyn AuthGateway>,
    /// Profile table.
    pub profiles: Arc<dyn ProfileRepository>,
    /// Task table.
    pub tasks: Arc<dyn TaskRepository>,
    /// Account creation strategy.
    pub provisioner: Arc<dyn AccountProvisioner>,
    /// Notice sink.
    pub notifier: Arc<dyn Notifier>,
    /// Source of local timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Sleeper used by profile retries.
    pub sleeper: Arc<dyn Sleeper>,
    /// Profile retry policy.
    pub retry: RetryPolicy,
}

impl BoardPorts {
    /// Supabase-backed ports built from settings.
    ///
    /// The admin provisioner is used when a service-role key is configured,
    /// otherwise accounts are created through public sign-up.
    pub fn supabase(settings: &AppSettings) -> Result<Self, WiringError> {
        let connection = settings.connection()?;
        let client = SupabaseClient::new(connection.url, connection.anon_key, connection.timeout)?;
        let auth: Arc<dyn AuthGateway> = Arc::new(SupabaseAuth::new(client.clone()));
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);

        let provisioner: Arc<dyn AccountProvisioner> = match settings.service_role_key() {
            Some(key) => {
                info!("account creation via admin API");
                Arc::new(SupabaseAdminProvisioner::new(client.clone(), key))
            }
            None => {
                info!("account creation via public sign-up");
                Arc::new(SignUpProvisioner::new(
                    auth.clone(),
                    sleeper.clone(),
                    settings.account_settle_delay(),
                ))
            }
        };

        Ok(Self {
            auth,
            profiles: Arc::new(SupabaseProfiles::new(client.clone())),
            tasks: Arc::new(SupabaseTasks::new(client)),
            provisioner,
            notifier: Arc::new(TracingNotifier),
            clock: Arc::new(mockable::DefaultClock),
            sleeper,
            retry: settings.profile_retry(),
        })
    }

    /// Ports sharing one backend that implements all three data ports.
    ///
    /// Accounts are provisioned through the backend's sign-up with no settle
    /// delay.
    pub fn single_backend<B>(
        backend: Arc<B>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock + Send + Sync>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self
    where
        B: AuthGateway + ProfileRepository + TaskRepository + 'static,
    {
        let auth: Arc<dyn AuthGateway> = backend.clone();
        Self {
            provisioner: Arc::new(SignUpProvisioner::new(
                auth.clone(),
                sleeper.clone(),
                Duration::ZERO,
            )),
            auth,
            profiles: backend.clone(),
            tasks: backend,
            notifier,
            clock,
            sleeper,
            retry: RetryPolicy::default(),
        }
    }
}

/// Running stores plus the guards keeping their listeners alive.
pub struct TaskBoard {
    /// Session store.
    pub session: Arc<SessionStore>,
    /// Roster store.
    pub users: Arc<UserDirectory>,
    /// Task store.
    pub tasks: Arc<TaskStore>,
    _listeners: Vec<ListenerGuard>,
}

impl TaskBoard {
    /// Build the stores and start the auth watcher and session followers.
    ///
    /// Must run inside a Tokio runtime.
    pub fn assemble(ports: BoardPorts) -> Self {
        let session = Arc::new(SessionStore::with_retry(
            ports.auth,
            ports.profiles.clone(),
            ports.notifier.clone(),
            ports.sleeper,
            ports.retry,
        ));
        let users = Arc::new(UserDirectory::new(
            session.clone(),
            ports.profiles,
            ports.provisioner,
            ports.notifier.clone(),
        ));
        let tasks = Arc::new(TaskStore::new(
            session.clone(),
            ports.tasks,
            ports.notifier,
            ports.clock,
        ));
        let listeners = vec![
            session.watch_auth_changes(),
            users.follow_session(),
            tasks.follow_session(),
        ];
        Self {
            session,
            users,
            tasks,
            _listeners: listeners,
        }
    }

    /// Restore any existing session and load the data its view needs.
    pub async fn start(&self) {
        self.session.restore().await;
        self.refresh().await;
    }

    /// Reload the roster, and the tasks when signed in.
    pub async fn refresh(&self) {
        self.users.load_users().await;
        if self.session.current_user().is_some() {
            self.tasks.load_tasks().await;
        }
    }

    /// The view for the current state.
    pub fn view(&self) -> ShellView {
        route(
            &self.session.snapshot(),
            &self.users.all_users(),
            &self.tasks.tasks(),
        )
    }
}
