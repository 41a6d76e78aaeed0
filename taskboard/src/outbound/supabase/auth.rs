//! GoTrue adapter for the auth gateway port.
//!
//! The active session lives in memory only; the CLI signs in for every
//! invocation, so there is nothing to persist or refresh.

use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::client::{CallError, SupabaseClient};
use super::dto::{PasswordGrantBody, ProfileMetadata, SessionDto, SignUpBody, SignUpResponseDto};
use super::errors::map_auth_failure;
use crate::domain::ports::{AuthGateway, AuthGatewayError};
use crate::domain::{AuthEvent, AuthIdentity, IssuedSession, LoginCredentials, NewUser, SignUpOutcome};

/// Auth gateway over `/auth/v1`.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: SupabaseClient,
}

impl SupabaseAuth {
    /// Wrap the shared client.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

fn map_call_error(error: CallError) -> AuthGatewayError {
    match error {
        CallError::Transport(message) | CallError::Url(message) => {
            AuthGatewayError::transport(message)
        }
        CallError::Api(failure) => map_auth_failure(failure),
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, AuthGatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| AuthGatewayError::transport(format!("invalid auth payload: {err}")))
}

#[async_trait]
impl AuthGateway for SupabaseAuth {
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthIdentity, AuthGatewayError> {
        let mut url = self
            .client
            .endpoint("/auth/v1/token")
            .map_err(map_call_error)?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self
            .client
            .anonymous_request(Method::POST, url)
            .json(&PasswordGrantBody {
                email: credentials.email(),
                password: credentials.password(),
            });
        let body = self.client.send(request).await.map_err(map_call_error)?;
        let session = decode::<SessionDto>(&body)?
            .into_session()
            .map_err(AuthGatewayError::transport)?;

        let identity = session.identity().clone();
        self.client.replace_session(Some(session));
        self.client.emit(AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, form: &NewUser) -> Result<SignUpOutcome, AuthGatewayError> {
        let url = self
            .client
            .endpoint("/auth/v1/signup")
            .map_err(map_call_error)?;
        let request = self
            .client
            .anonymous_request(Method::POST, url)
            .json(&SignUpBody {
                email: form.email().as_ref(),
                password: form.password(),
                data: ProfileMetadata::from(form),
            });
        let body = self.client.send(request).await.map_err(map_call_error)?;

        match decode::<SignUpResponseDto>(&body)? {
            SignUpResponseDto::Session(dto) => {
                let session = dto.into_session().map_err(AuthGatewayError::transport)?;
                Ok(SignUpOutcome {
                    identity: session.identity().clone(),
                    session: Some(session),
                })
            }
            SignUpResponseDto::User(user) => {
                debug!(user_id = %user.id, "sign-up awaits email confirmation");
                Ok(SignUpOutcome {
                    identity: user.into_identity().map_err(AuthGatewayError::transport)?,
                    session: None,
                })
            }
        }
    }

    async fn adopt_session(&self, session: IssuedSession) -> Result<(), AuthGatewayError> {
        let identity = session.identity().clone();
        self.client.replace_session(Some(session));
        self.client.emit(AuthEvent::SignedIn(identity));
        Ok(())
    }

    async fn revoke_session(&self, session: &IssuedSession) -> Result<(), AuthGatewayError> {
        let url = self
            .client
            .endpoint("/auth/v1/logout")
            .map_err(map_call_error)?;
        let request = self
            .client
            .request_with_bearer(Method::POST, url, session.access_token());
        self.client.send(request).await.map_err(map_call_error)?;
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthGatewayError> {
        let Some(session) = self.client.active_session() else {
            return Ok(());
        };
        self.client.replace_session(None);
        self.client.emit(AuthEvent::SignedOut);
        if let Err(err) = self.revoke_session(&session).await {
            warn!(error = %err, "remote sign-out failed after clearing the local session");
            return Err(err);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthIdentity>, AuthGatewayError> {
        Ok(self
            .client
            .active_session()
            .map(|session| session.identity().clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.client.subscribe()
    }
}
