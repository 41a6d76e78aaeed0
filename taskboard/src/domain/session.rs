//! Session store: the signed-in user and the loading flag.
//!
//! The store is the only writer of the session. Other stores observe it
//! through [`SessionStore::subscribe`] or register a [`SessionFollower`].
//! Every public operation reports failures as notices and returns a plain
//! outcome; nothing propagates past the store.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::background::ListenerGuard;
use crate::domain::ports::{AuthGateway, AuthGatewayError, Notice, Notifier, ProfileRepository};
use crate::domain::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::domain::{AuthEvent, LoginCredentials, LoginFailure, NewUser, User, UserId};

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Resolved profile of the signed-in user.
    pub user: Option<User>,
    /// True until the first resolution finishes and while a sign-in runs.
    pub loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Store reacting to identity changes of the session user.
#[async_trait]
pub trait SessionFollower: Send + Sync {
    /// Called once at registration when a user is signed in, then whenever
    /// the signed-in user's id changes (including to `None`).
    async fn session_user_changed(&self, user: Option<User>);
}

/// Holds the current user and wraps the auth port.
pub struct SessionStore {
    auth: Arc<dyn AuthGateway>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn Notifier>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    state: watch::Sender<SessionSnapshot>,
    // Bumped whenever the signed-in user's id changes, so followers never
    // lose a transition to coalescing.
    transitions: watch::Sender<u64>,
}

impl SessionStore {
    /// Build a store with the default retry policy and a Tokio sleeper.
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_retry(
            auth,
            profiles,
            notifier,
            Arc::new(TokioSleeper),
            RetryPolicy::default(),
        )
    }

    /// Build a store with an explicit retry policy and sleeper.
    pub fn with_retry(
        auth: Arc<dyn AuthGateway>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn Notifier>,
        sleeper: Arc<dyn Sleeper>,
        retry: RetryPolicy,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        let (transitions, _) = watch::channel(0);
        Self {
            auth,
            profiles,
            notifier,
            sleeper,
            retry,
            state,
            transitions,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Signed-in user, if resolved.
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Whether a resolution is in progress.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Observe snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Pick up a session the auth port already holds.
    ///
    /// Returns true when a user was restored.
    pub async fn restore(&self) -> bool {
        match self.auth.current_session().await {
            Ok(Some(identity)) => self.resolve_profile(&identity.user_id).await.is_some(),
            Ok(None) => {
                self.finish(None);
                false
            }
            Err(err) => {
                warn!(error = %err, "could not read the current session");
                self.finish(None);
                false
            }
        }
    }

    /// Sign in and resolve the profile.
    ///
    /// Returns true only when the profile was resolved.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let credentials = match LoginCredentials::try_from_parts(email, password) {
            Ok(credentials) => credentials,
            Err(err) => {
                self.notifier
                    .notify(Notice::destructive("Dados inválidos", err.to_string()));
                return false;
            }
        };

        self.set_loading(true);
        match self.auth.sign_in_with_password(&credentials).await {
            Ok(identity) => {
                info!(user_id = %identity.user_id, "signed in");
                self.resolve_profile(&identity.user_id).await.is_some()
            }
            Err(err) => {
                warn!(error = %err, email = credentials.email(), "sign-in failed");
                self.notifier
                    .notify(login_failure_notice(&classify_login_failure(&err)));
                self.set_loading(false);
                false
            }
        }
    }

    /// End the session. The local user is cleared even if the backend call fails.
    pub async fn logout(&self) {
        if let Err(err) = self.auth.sign_out().await {
            warn!(error = %err, "backend sign-out failed; clearing local session anyway");
        }
        self.finish(None);
        info!("signed out");
    }

    /// Self-registration. The issued session, if any, becomes active.
    pub async fn sign_up(&self, form: &NewUser) -> bool {
        self.set_loading(true);
        let outcome = match self.auth.sign_up(form).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, email = %form.email(), "sign-up failed");
                self.notifier
                    .notify(Notice::destructive("Erro", "Erro ao criar conta"));
                self.set_loading(false);
                return false;
            }
        };

        let user_id = outcome.identity.user_id.clone();
        let Some(session) = outcome.session else {
            self.notifier.notify(Notice::info(
                "Conta criada!",
                "Confirme seu email antes de fazer login.",
            ));
            self.set_loading(false);
            return true;
        };

        if let Err(err) = self.auth.adopt_session(session).await {
            warn!(error = %err, %user_id, "could not activate the new session");
            self.notifier
                .notify(Notice::destructive("Erro", "Erro ao criar conta"));
            self.set_loading(false);
            return false;
        }

        self.notifier.notify(Notice::info(
            "Conta criada!",
            "Sua conta foi criada com sucesso. Você já está logado.",
        ));
        self.resolve_profile(&user_id).await;
        true
    }

    /// Re-resolve the profile on every auth-state change.
    ///
    /// Drop the returned guard to unsubscribe.
    pub fn watch_auth_changes(self: &Arc<Self>) -> ListenerGuard {
        let mut events = self.auth.subscribe();
        let store = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(store) = store.upgrade() else {
                            break;
                        };
                        store.apply_auth_event(event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "auth events dropped before they were observed");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("auth listener stopped");
        });
        ListenerGuard::new(handle)
    }

    async fn apply_auth_event(&self, event: AuthEvent) {
        debug!(?event, "auth state changed");
        match event {
            AuthEvent::SignedIn(identity) => {
                if self
                    .current_user()
                    .is_some_and(|user| user.id() == &identity.user_id)
                {
                    return;
                }
                // Events queue up; only the session the port still holds counts.
                match self.auth.current_session().await {
                    Ok(Some(active)) if active.user_id == identity.user_id => {
                        self.resolve_profile(&identity.user_id).await;
                    }
                    Ok(_) => debug!(user_id = %identity.user_id, "ignoring stale sign-in event"),
                    Err(err) => warn!(error = %err, "could not confirm sign-in event"),
                }
            }
            AuthEvent::SignedOut => self.finish(None),
        }
    }

    /// Load the profile of `user_id`, retrying while the row is not visible.
    async fn resolve_profile(&self, user_id: &UserId) -> Option<User> {
        let mut attempt = 1;
        let resolved = loop {
            match self.profiles.find_by_id(user_id).await {
                Ok(Some(user)) => break Some(user),
                Ok(None) if self.retry.allows_retry_after(attempt) => {
                    debug!(%user_id, attempt, "profile not visible yet, retrying");
                    self.sleeper.sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Ok(None) => {
                    warn!(%user_id, attempts = attempt, "profile not found after retries");
                    self.notifier.notify(Notice::destructive(
                        "Perfil não encontrado",
                        "Seu perfil está sendo configurado. Tente fazer login novamente em alguns instantes.",
                    ));
                    break None;
                }
                Err(err) => {
                    error!(error = %err, %user_id, "failed to load profile");
                    self.notifier.notify(Notice::destructive(
                        "Erro",
                        "Erro ao carregar perfil do usuário",
                    ));
                    break None;
                }
            }
        };
        self.finish(resolved.clone());
        resolved
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    fn finish(&self, user: Option<User>) {
        let mut switched = false;
        self.state.send_modify(|state| {
            switched = state.user.as_ref().map(User::id) != user.as_ref().map(User::id);
            state.user = user;
            state.loading = false;
        });
        if switched {
            self.transitions.send_modify(|count| *count = count.wrapping_add(1));
        }
    }
}

/// Register `follower` for identity changes of the session user.
///
/// The starting state is read at registration, so transitions made before
/// the listener first runs are still delivered. Transitions that land
/// between two polls are collapsed into one call with the latest user.
pub fn follow_session<F>(session: &SessionStore, follower: &Arc<F>) -> ListenerGuard
where
    F: SessionFollower + 'static,
{
    let mut transitions = session.transitions.subscribe();
    transitions.borrow_and_update();
    let state = session.subscribe();
    let initial = state.borrow().user.clone();
    let follower: Weak<F> = Arc::downgrade(follower);
    let handle = tokio::spawn(async move {
        if initial.is_some() {
            let Some(target) = follower.upgrade() else {
                return;
            };
            target.session_user_changed(initial).await;
        }

        while transitions.changed().await.is_ok() {
            transitions.borrow_and_update();
            let user = state.borrow().user.clone();
            let Some(target) = follower.upgrade() else {
                break;
            };
            target.session_user_changed(user).await;
        }
    });
    ListenerGuard::new(handle)
}

fn classify_login_failure(error: &AuthGatewayError) -> LoginFailure {
    match error {
        AuthGatewayError::EmailNotConfirmed => LoginFailure::EmailNotConfirmed,
        AuthGatewayError::InvalidCredentials => LoginFailure::InvalidCredentials,
        AuthGatewayError::Rejected { message } => LoginFailure::Other(message.clone()),
        AuthGatewayError::Transport { .. } => {
            LoginFailure::Other("Erro inesperado durante o login".to_owned())
        }
    }
}

fn login_failure_notice(failure: &LoginFailure) -> Notice {
    match failure {
        LoginFailure::EmailNotConfirmed => Notice::destructive(
            "Email não confirmado",
            "Verifique sua caixa de entrada e confirme seu email antes de fazer login.",
        ),
        LoginFailure::InvalidCredentials => Notice::destructive(
            "Credenciais inválidas",
            "Email ou senha incorretos. Verifique suas credenciais.",
        ),
        LoginFailure::Other(message) => Notice::destructive("Erro de login", message.clone()),
    }
}
