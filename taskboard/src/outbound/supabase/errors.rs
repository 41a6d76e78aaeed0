//! Classification of transport failures and error responses.

use reqwest::StatusCode;

use super::dto::ApiErrorDto;
use crate::domain::ports::{
    AuthGatewayError, ProfileRepositoryError, ProvisioningError, TaskRepositoryError,
};
use crate::domain::provisioning::is_duplicate_message;

/// Decoded non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ApiFailure {
    pub(super) status: StatusCode,
    pub(super) code: Option<String>,
    pub(super) message: String,
}

impl ApiFailure {
    pub(super) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let dto: ApiErrorDto = serde_json::from_slice(body).unwrap_or_default();
        let message = dto.text().map_or_else(
            || {
                let preview = body_preview(body);
                if preview.is_empty() {
                    format!("status {}", status.as_u16())
                } else {
                    format!("status {}: {preview}", status.as_u16())
                }
            },
            str::to_owned,
        );
        Self {
            status,
            code: dto.error_code,
            message,
        }
    }

    fn code_is(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }

    fn message_contains(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
    }

    fn is_duplicate_account(&self) -> bool {
        self.code_is("user_already_exists")
            || self.code_is("email_exists")
            || is_duplicate_message(&self.message)
    }
}

pub(super) fn map_auth_failure(failure: ApiFailure) -> AuthGatewayError {
    if failure.code_is("email_not_confirmed") || failure.message_contains("email not confirmed") {
        return AuthGatewayError::EmailNotConfirmed;
    }
    if failure.code_is("invalid_credentials")
        || failure.message_contains("invalid login credentials")
    {
        return AuthGatewayError::InvalidCredentials;
    }
    if failure.status.is_server_error() {
        return AuthGatewayError::transport(failure.message);
    }
    AuthGatewayError::rejected(failure.message)
}

pub(super) fn map_provisioning_failure(failure: ApiFailure, email: &str) -> ProvisioningError {
    if failure.is_duplicate_account() {
        return ProvisioningError::duplicate_email(email);
    }
    if failure.status.is_server_error() {
        return ProvisioningError::transport(failure.message);
    }
    ProvisioningError::rejected(failure.message)
}

pub(super) fn map_profile_failure(failure: ApiFailure) -> ProfileRepositoryError {
    if failure.status.is_server_error() {
        ProfileRepositoryError::connection(failure.message)
    } else {
        ProfileRepositoryError::query(failure.message)
    }
}

pub(super) fn map_task_failure(failure: ApiFailure) -> TaskRepositoryError {
    if failure.status.is_server_error() {
        TaskRepositoryError::connection(failure.message)
    } else {
        TaskRepositoryError::query(failure.message)
    }
}

/// Describe a reqwest failure, flagging timeouts.
pub(super) fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
