//! Driven port for the hosted authentication service.
//!
//! Adapters own token storage and transport; the domain only sees
//! identities, issued sessions and auth-state events.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{AuthEvent, AuthIdentity, IssuedSession, LoginCredentials, NewUser, SignUpOutcome};

use super::define_port_error;

define_port_error! {
    /// Errors raised by auth service adapters.
    pub enum AuthGatewayError {
        /// The account exists but its email is unconfirmed.
        EmailNotConfirmed => "email not confirmed",
        /// Email or password did not match.
        InvalidCredentials => "invalid login credentials",
        /// The service refused the request.
        Rejected { message: String } => "auth service rejected the request: {message}",
        /// The service could not be reached or answered unexpectedly.
        Transport { message: String } => "auth service transport failed: {message}",
    }
}

/// Port for sign-in, sign-up, sign-out and auth-state notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Authenticate with email and password; the new session becomes active.
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthIdentity, AuthGatewayError>;

    /// Register an account, passing the profile fields as metadata.
    ///
    /// Any issued session is returned to the caller and is NOT made active.
    async fn sign_up(&self, form: &NewUser) -> Result<SignUpOutcome, AuthGatewayError>;

    /// Make a session returned by [`AuthGateway::sign_up`] the active one.
    async fn adopt_session(&self, session: IssuedSession) -> Result<(), AuthGatewayError>;

    /// Revoke a session that is not the active one.
    async fn revoke_session(&self, session: &IssuedSession) -> Result<(), AuthGatewayError>;

    /// End the active session.
    ///
    /// Adapters clear their local session even when the remote call fails.
    async fn sign_out(&self) -> Result<(), AuthGatewayError>;

    /// Identity of the active session, if any.
    async fn current_session(&self) -> Result<Option<AuthIdentity>, AuthGatewayError>;

    /// Register for auth-state changes of the active session.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
