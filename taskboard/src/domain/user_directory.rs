//! User directory store: the roster and role-gated account creation.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::background::ListenerGuard;
use crate::domain::ports::{AccountProvisioner, Notice, Notifier, ProfileRepository, ProvisioningError};
use crate::domain::session::{SessionFollower, SessionStore, follow_session};
use crate::domain::{Error, ErrorCode, NewUser, Role, User, UserId};

/// Display name given to the first manager.
pub const BOOTSTRAP_MANAGER_NAME: &str = "Gerente do Sistema";
/// Department given to the first manager.
pub const BOOTSTRAP_MANAGER_DEPARTMENT: &str = "Administração";

/// In-memory roster plus user creation.
pub struct UserDirectory {
    session: Arc<SessionStore>,
    profiles: Arc<dyn ProfileRepository>,
    provisioner: Arc<dyn AccountProvisioner>,
    notifier: Arc<dyn Notifier>,
    users: RwLock<Vec<User>>,
    creating: AtomicBool,
}

impl UserDirectory {
    /// Build an empty directory.
    pub fn new(
        session: Arc<SessionStore>,
        profiles: Arc<dyn ProfileRepository>,
        provisioner: Arc<dyn AccountProvisioner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            profiles,
            provisioner,
            notifier,
            users: RwLock::new(Vec::new()),
            creating: AtomicBool::new(false),
        }
    }

    /// Replace the roster with all profiles ordered by name.
    pub async fn load_users(&self) -> bool {
        match self.profiles.list_ordered_by_name().await {
            Ok(users) => {
                info!(count = users.len(), "roster loaded");
                *self.users.write().unwrap_or_else(PoisonError::into_inner) = users;
                true
            }
            Err(err) => {
                error!(error = %err, "failed to load roster");
                self.notifier
                    .notify(Notice::destructive("Erro", "Erro ao carregar usuários"));
                false
            }
        }
    }

    /// Create an account on behalf of the signed-in user.
    ///
    /// Allowed when the roster has no manager yet or the acting user is a
    /// manager. The roster is reloaded after a successful creation.
    pub async fn create_user(&self, form: &NewUser) -> bool {
        let acting = self.session.current_user();
        self.creating.store(true, Ordering::SeqCst);
        let result = self.try_create(acting.as_ref(), form).await;
        self.creating.store(false, Ordering::SeqCst);

        match result {
            Ok(user_id) => {
                info!(%user_id, role = %form.role(), "account created");
                let (title, description) = creation_notice(form.role());
                self.notifier.notify(Notice::info(title, description));
                self.load_users().await;
                true
            }
            Err(err) => {
                self.notifier.notify(failure_notice(&err));
                false
            }
        }
    }

    /// Create the first manager from the initial-setup screen.
    ///
    /// Refused while a user is signed in or once a manager exists.
    pub async fn bootstrap_manager(&self, email: &str, password: &str) -> bool {
        if self.session.current_user().is_some() || self.has_manager() {
            warn!("bootstrap refused: a manager or session already exists");
            self.notifier.notify(Notice::destructive(
                "Configuração já realizada",
                "Já existe um gerente no sistema.",
            ));
            return false;
        }

        let form = match NewUser::try_from_parts(
            BOOTSTRAP_MANAGER_NAME,
            email,
            password,
            Role::Manager,
            Some(BOOTSTRAP_MANAGER_DEPARTMENT),
        ) {
            Ok(form) => form,
            Err(err) => {
                self.notifier
                    .notify(Notice::destructive("Dados inválidos", err.to_string()));
                return false;
            }
        };
        self.create_user(&form).await
    }

    /// Whether a creation is in flight.
    pub fn is_creating_user(&self) -> bool {
        self.creating.load(Ordering::SeqCst)
    }

    /// Look up a loaded user.
    pub fn user_by_id(&self, id: &UserId) -> Option<User> {
        self.read_users()
            .iter()
            .find(|user| user.id() == id)
            .cloned()
    }

    /// Snapshot of the roster.
    pub fn all_users(&self) -> Vec<User> {
        self.read_users().clone()
    }

    /// Whether the loaded roster contains a manager.
    pub fn has_manager(&self) -> bool {
        self.read_users().iter().any(User::is_manager)
    }

    /// Loaded users with the employee role.
    pub fn employees(&self) -> Vec<User> {
        self.read_users()
            .iter()
            .filter(|user| user.role() == Role::Employee)
            .cloned()
            .collect()
    }

    /// Reload the roster whenever the signed-in user changes.
    pub fn follow_session(self: &Arc<Self>) -> ListenerGuard {
        follow_session(&self.session, self)
    }

    async fn try_create(&self, acting: Option<&User>, form: &NewUser) -> Result<UserId, Error> {
        if self.has_manager() && !acting.is_some_and(User::is_manager) {
            warn!(
                acting = acting.map(|user| user.id().to_string()),
                "account creation refused for non-manager"
            );
            return Err(Error::forbidden("Apenas gerentes podem criar usuários"));
        }

        match self.profiles.find_by_email(form.email()).await {
            Ok(Some(_)) => {
                return Err(Error::conflict("Já existe um usuário com este email"));
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "email pre-flight failed");
                return Err(Error::service_unavailable(err.to_string()));
            }
        }

        self.provisioner.provision(form).await.map_err(|err| match err {
            ProvisioningError::DuplicateEmail { .. } => {
                Error::conflict("Já existe um usuário com este email")
            }
            ProvisioningError::Transport { message } => {
                error!(%message, "provisioning transport failed");
                Error::service_unavailable(message)
            }
            ProvisioningError::Rejected { message } => {
                error!(%message, "provisioning rejected");
                Error::internal(message)
            }
        })
    }

    fn read_users(&self) -> RwLockReadGuard<'_, Vec<User>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionFollower for UserDirectory {
    async fn session_user_changed(&self, user: Option<User>) {
        // Anonymous sessions still read the roster to detect bootstrap.
        debug!(signed_in = user.is_some(), "session changed, reloading roster");
        self.load_users().await;
    }
}

fn creation_notice(role: Role) -> (&'static str, String) {
    let title = if role == Role::Manager {
        "Gerente criado!"
    } else {
        "Usuário criado!"
    };
    (title, format!("O novo {} foi criado com sucesso", role.label().to_lowercase()))
}

fn failure_notice(error: &Error) -> Notice {
    match error.code() {
        ErrorCode::Forbidden => Notice::destructive("Acesso negado", error.message()),
        ErrorCode::Conflict => Notice::destructive("Erro", error.message()),
        _ => Notice::destructive("Erro", "Erro ao criar usuário"),
    }
}
