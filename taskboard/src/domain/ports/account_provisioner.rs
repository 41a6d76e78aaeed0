//! Driven port for creating accounts on behalf of the acting user.
//!
//! Creating an account must never replace the acting user's session.
//! Implementations either use a privileged endpoint or sign the new account
//! back out after registering it.

use async_trait::async_trait;

use crate::domain::{NewUser, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while provisioning an account.
    pub enum ProvisioningError {
        /// The backend already holds an account for this email.
        DuplicateEmail { email: String } => "an account already exists for {email}",
        /// The backend refused to create the account.
        Rejected { message: String } => "account creation rejected: {message}",
        /// The backend could not be reached.
        Transport { message: String } => "account creation transport failed: {message}",
    }
}

/// Port creating an auth account plus its linked profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountProvisioner: Send + Sync {
    /// Create the account and return its id once the profile row is expected
    /// to exist.
    async fn provision(&self, form: &NewUser) -> Result<UserId, ProvisioningError>;
}
