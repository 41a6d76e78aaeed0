//! Account provisioning over the public sign-up endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{AccountProvisioner, AuthGateway, AuthGatewayError, ProvisioningError};
use crate::domain::retry::Sleeper;
use crate::domain::{NewUser, UserId};

/// Default pause that lets the backend trigger create the profile row.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Provisions accounts by signing them up, then revoking the issued session.
///
/// The auth port never activates a sign-up session, so the acting user's
/// session survives; revoking keeps the new account's tokens from lingering.
pub struct SignUpProvisioner {
    auth: Arc<dyn AuthGateway>,
    sleeper: Arc<dyn Sleeper>,
    settle_delay: Duration,
}

impl SignUpProvisioner {
    /// Build a provisioner over the auth port.
    pub fn new(auth: Arc<dyn AuthGateway>, sleeper: Arc<dyn Sleeper>, settle_delay: Duration) -> Self {
        Self {
            auth,
            sleeper,
            settle_delay,
        }
    }
}

#[async_trait]
impl AccountProvisioner for SignUpProvisioner {
    async fn provision(&self, form: &NewUser) -> Result<UserId, ProvisioningError> {
        let outcome = self
            .auth
            .sign_up(form)
            .await
            .map_err(|err| map_sign_up_error(form, err))?;

        debug!(
            user_id = %outcome.identity.user_id,
            delay_ms = self.settle_delay.as_millis(),
            "account registered, waiting for profile trigger"
        );
        self.sleeper.sleep(self.settle_delay).await;

        if let Some(session) = outcome.session {
            if let Err(err) = self.auth.revoke_session(&session).await {
                warn!(error = %err, user_id = %outcome.identity.user_id, "could not revoke sign-up session");
            }
        }
        Ok(outcome.identity.user_id)
    }
}

fn map_sign_up_error(form: &NewUser, error: AuthGatewayError) -> ProvisioningError {
    match error {
        AuthGatewayError::Rejected { message } if is_duplicate_message(&message) => {
            ProvisioningError::duplicate_email(form.email().as_ref())
        }
        AuthGatewayError::Transport { message } => ProvisioningError::transport(message),
        other => ProvisioningError::rejected(other.to_string()),
    }
}

/// Whether an auth service message reports an existing account.
pub(crate) fn is_duplicate_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("already registered") || lowered.contains("already been registered")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockAuthGateway;
    use crate::domain::{AuthIdentity, IssuedSession, Role, SignUpOutcome};
    use crate::test_support::RecordingSleeper;
    use rstest::rstest;

    fn form() -> NewUser {
        NewUser::try_from_parts("Bruno", "bruno@loja.com", "segredo", Role::Employee, None)
            .expect("valid form")
    }

    fn outcome(with_session: bool) -> SignUpOutcome {
        let identity = AuthIdentity {
            user_id: UserId::random(),
            email: Some("bruno@loja.com".to_owned()),
        };
        let session = with_session.then(|| IssuedSession::new(identity.clone(), "token"));
        SignUpOutcome { identity, session }
    }

    #[rstest]
    #[tokio::test]
    async fn waits_then_revokes_issued_session() {
        let signed_up = outcome(true);
        let expected = signed_up.identity.user_id.clone();
        let mut auth = MockAuthGateway::new();
        auth.expect_sign_up()
            .times(1)
            .return_once(move |_| Ok(signed_up));
        auth.expect_revoke_session().times(1).return_once(|_| Ok(()));
        let sleeper = Arc::new(RecordingSleeper::default());

        let provisioner = SignUpProvisioner::new(Arc::new(auth), sleeper.clone(), DEFAULT_SETTLE_DELAY);
        let id = provisioner.provision(&form()).await.expect("provisioned");

        assert_eq!(id, expected);
        assert_eq!(sleeper.recorded(), vec![DEFAULT_SETTLE_DELAY]);
    }

    #[rstest]
    #[tokio::test]
    async fn skips_revoke_without_session() {
        let signed_up = outcome(false);
        let mut auth = MockAuthGateway::new();
        auth.expect_sign_up().return_once(move |_| Ok(signed_up));
        auth.expect_revoke_session().never();

        let provisioner = SignUpProvisioner::new(
            Arc::new(auth),
            Arc::new(RecordingSleeper::default()),
            Duration::ZERO,
        );
        provisioner.provision(&form()).await.expect("provisioned");
    }

    #[rstest]
    #[tokio::test]
    async fn revoke_failure_still_succeeds() {
        let signed_up = outcome(true);
        let mut auth = MockAuthGateway::new();
        auth.expect_sign_up().return_once(move |_| Ok(signed_up));
        auth.expect_revoke_session()
            .return_once(|_| Err(AuthGatewayError::transport("reset")));

        let provisioner = SignUpProvisioner::new(
            Arc::new(auth),
            Arc::new(RecordingSleeper::default()),
            Duration::ZERO,
        );
        assert!(provisioner.provision(&form()).await.is_ok());
    }

    #[rstest]
    #[case(AuthGatewayError::rejected("User already registered"), true)]
    #[case(AuthGatewayError::rejected("Password should be at least 6 characters"), false)]
    #[case(AuthGatewayError::transport("timeout"), false)]
    fn maps_duplicate_accounts(#[case] error: AuthGatewayError, #[case] duplicate: bool) {
        let mapped = map_sign_up_error(&form(), error);
        assert_eq!(
            matches!(mapped, ProvisioningError::DuplicateEmail { .. }),
            duplicate
        );
    }
}
