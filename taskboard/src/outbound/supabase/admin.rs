//! Account provisioning through the GoTrue admin API.
//!
//! The service-role key never authenticates as the new user, so the acting
//! session is untouched and no settle delay or sign-out is needed beyond
//! the profile trigger itself.

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;
use zeroize::Zeroizing;

use super::client::{CallError, SupabaseClient};
use super::dto::{AdminCreateUserBody, AuthUserDto, ProfileMetadata};
use super::errors::map_provisioning_failure;
use crate::domain::ports::{AccountProvisioner, ProvisioningError};
use crate::domain::{NewUser, UserId};

/// Provisioner that calls `POST /auth/v1/admin/users`.
pub struct SupabaseAdminProvisioner {
    client: SupabaseClient,
    service_role_key: Zeroizing<String>,
}

impl SupabaseAdminProvisioner {
    /// Build a provisioner authorised with the service-role key.
    pub fn new(client: SupabaseClient, service_role_key: impl Into<String>) -> Self {
        Self {
            client,
            service_role_key: Zeroizing::new(service_role_key.into()),
        }
    }
}

#[async_trait]
impl AccountProvisioner for SupabaseAdminProvisioner {
    async fn provision(&self, form: &NewUser) -> Result<UserId, ProvisioningError> {
        let email = form.email().as_ref();
        let url = self
            .client
            .endpoint("/auth/v1/admin/users")
            .map_err(|err| map_call_error(err, email))?;
        let request = self
            .client
            .request_with_bearer(Method::POST, url, self.service_role_key.as_str())
            .json(&AdminCreateUserBody {
                email,
                password: form.password(),
                email_confirm: true,
                user_metadata: ProfileMetadata::from(form),
            });
        let body = self
            .client
            .send(request)
            .await
            .map_err(|err| map_call_error(err, email))?;

        let user: AuthUserDto = serde_json::from_slice(&body).map_err(|err| {
            ProvisioningError::transport(format!("invalid admin payload: {err}"))
        })?;
        let identity = user.into_identity().map_err(ProvisioningError::transport)?;
        info!(user_id = %identity.user_id, "account provisioned via admin API");
        Ok(identity.user_id)
    }
}

fn map_call_error(error: CallError, email: &str) -> ProvisioningError {
    match error {
        CallError::Transport(message) | CallError::Url(message) => {
            ProvisioningError::transport(message)
        }
        CallError::Api(failure) => map_provisioning_failure(failure, email),
    }
}
