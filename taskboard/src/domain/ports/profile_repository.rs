//! Port abstraction for the `profiles` table and its errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by profile repository adapters.
    pub enum ProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "profile repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "profile repository query failed: {message}",
        /// A stored row could not be mapped to a user.
        Decode { message: String } => "profile row could not be decoded: {message}",
    }
}

/// Read access to user profiles.
///
/// Profiles are written by a backend trigger when an auth account is
/// created, so there is no insert here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// All profiles ordered by name.
    async fn list_ordered_by_name(&self) -> Result<Vec<User>, ProfileRepositoryError>;

    /// Fetch a profile by account id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, ProfileRepositoryError>;

    /// Fetch a profile by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, ProfileRepositoryError>;
}
