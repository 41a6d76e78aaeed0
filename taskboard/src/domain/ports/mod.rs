//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_provisioner;
mod auth_gateway;
mod notifier;
mod profile_repository;
mod task_repository;

#[cfg(test)]
pub use account_provisioner::MockAccountProvisioner;
pub use account_provisioner::{AccountProvisioner, ProvisioningError};
#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{AuthGateway, AuthGatewayError};
pub use notifier::{Notice, NoticeTone, Notifier, SilentNotifier};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{ProfileRepository, ProfileRepositoryError};
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{TaskRepository, TaskRepositoryError};
