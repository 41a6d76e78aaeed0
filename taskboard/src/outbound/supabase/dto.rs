//! Wire DTOs for the PostgREST and GoTrue endpoints.
//!
//! Responses decode into these DTOs first, then map into domain values in
//! one pass so a malformed row fails as a decode error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AuthIdentity, IssuedSession, NewUser, Role, Task, TaskId, TaskInsert, TaskPatch, TaskPriority,
    TaskStatus, User, UserId,
};

#[derive(Debug, Deserialize)]
pub(super) struct ProfileRow {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) email: String,
    #[serde(rename = "type")]
    pub(super) role: String,
    pub(super) department: Option<String>,
}

impl ProfileRow {
    pub(super) fn into_domain(self) -> Result<User, String> {
        let id = UserId::new(&self.id).map_err(|err| format!("profile {}: {err}", self.id))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|err| format!("profile {}: {err}", self.id))?;
        User::try_new(id, self.name, self.email, role, self.department)
            .map_err(|err| format!("profile {}: {err}", self.id))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TaskRow {
    pub(super) id: Uuid,
    pub(super) title: String,
    pub(super) description: Option<String>,
    pub(super) assigned_to: String,
    pub(super) assigned_by: String,
    pub(super) status: String,
    pub(super) priority: String,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
    pub(super) due_date: Option<DateTime<Utc>>,
    pub(super) completed_at: Option<DateTime<Utc>>,
}

impl TaskRow {
    pub(super) fn into_domain(self) -> Result<Task, String> {
        let context = |err: &dyn std::fmt::Display| format!("task {}: {err}", self.id);
        Ok(Task {
            id: TaskId::from_uuid(self.id),
            assigned_to: UserId::new(&self.assigned_to).map_err(|err| context(&err))?,
            assigned_by: UserId::new(&self.assigned_by).map_err(|err| context(&err))?,
            status: self.status.parse::<TaskStatus>().map_err(|err| context(&err))?,
            priority: self
                .priority
                .parse::<TaskPriority>()
                .map_err(|err| context(&err))?,
            title: self.title,
            description: self.description.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            due_date: self.due_date,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct TaskInsertBody<'a> {
    title: &'a str,
    description: &'a str,
    assigned_to: &'a str,
    assigned_by: &'a str,
    status: &'static str,
    priority: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
}

impl<'a> From<&'a TaskInsert> for TaskInsertBody<'a> {
    fn from(insert: &'a TaskInsert) -> Self {
        let task = &insert.task;
        Self {
            title: task.title(),
            description: task.description(),
            assigned_to: task.assigned_to().as_ref(),
            assigned_by: insert.assigned_by.as_ref(),
            status: task.status().as_str(),
            priority: task.priority().as_str(),
            due_date: task.due_date(),
        }
    }
}

/// Only the fields present in the patch are serialised.
#[derive(Debug, Serialize)]
pub(super) struct TaskPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a TaskPatch> for TaskPatchBody<'a> {
    fn from(patch: &'a TaskPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            description: patch.description.as_deref(),
            status: patch.status.map(TaskStatus::as_str),
            priority: patch.priority.map(TaskPriority::as_str),
            due_date: patch.due_date,
            completed_at: patch.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrantBody<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ProfileMetadata<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    department: Option<&'a str>,
}

impl<'a> From<&'a NewUser> for ProfileMetadata<'a> {
    fn from(form: &'a NewUser) -> Self {
        Self {
            name: form.name(),
            role: form.role().as_str(),
            department: form.department(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SignUpBody<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) data: ProfileMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct AdminCreateUserBody<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) email_confirm: bool,
    pub(super) user_metadata: ProfileMetadata<'a>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthUserDto {
    pub(super) id: String,
    pub(super) email: Option<String>,
}

impl AuthUserDto {
    pub(super) fn into_identity(self) -> Result<AuthIdentity, String> {
        let user_id = UserId::new(&self.id).map_err(|err| format!("auth user {}: {err}", self.id))?;
        Ok(AuthIdentity {
            user_id,
            email: self.email,
        })
    }
}

/// Token grant response; also returned by sign-up when no confirmation is required.
#[derive(Debug, Deserialize)]
pub(super) struct SessionDto {
    pub(super) access_token: String,
    pub(super) refresh_token: Option<String>,
    pub(super) user: AuthUserDto,
}

impl SessionDto {
    pub(super) fn into_session(self) -> Result<IssuedSession, String> {
        let identity = self.user.into_identity()?;
        let session = IssuedSession::new(identity, self.access_token);
        Ok(match self.refresh_token {
            Some(refresh) => session.with_refresh_token(refresh),
            None => session,
        })
    }
}

/// Sign-up answers with a session, or with the bare user when confirmation
/// is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponseDto {
    Session(SessionDto),
    User(AuthUserDto),
}

/// Error payload shared by GoTrue and PostgREST; every field is optional
/// because the two services and their versions disagree on names.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiErrorDto {
    pub(super) error_code: Option<String>,
    pub(super) msg: Option<String>,
    pub(super) message: Option<String>,
    pub(super) error: Option<String>,
    pub(super) error_description: Option<String>,
}

impl ApiErrorDto {
    pub(super) fn text(&self) -> Option<&str> {
        self.msg
            .as_deref()
            .or(self.error_description.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row decoding and body shaping.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn task_row(status: &str) -> serde_json::Value {
        json!({
            "id": "5f0c4a52-7d1b-4a47-9a3e-7f1f5d0f9a01",
            "title": "Repor estoque",
            "description": null,
            "assigned_to": "0b6c3f0e-2a35-4a84-a7b4-5f2a6c8d1e11",
            "assigned_by": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "status": status,
            "priority": "alta",
            "created_at": "2026-06-01T08:00:00.123456+00:00",
            "updated_at": "2026-06-01T08:00:00+00:00",
            "due_date": null,
            "completed_at": null
        })
    }

    #[rstest]
    fn decodes_task_rows_with_null_description() {
        let row: TaskRow = serde_json::from_value(task_row("em_andamento")).expect("row decodes");
        let task = row.into_domain().expect("valid task");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert!(task.description.is_empty());
    }

    #[rstest]
    fn rejects_unknown_status() {
        let row: TaskRow = serde_json::from_value(task_row("arquivada")).expect("row decodes");
        assert!(row.into_domain().is_err());
    }

    #[rstest]
    #[case("funcionario", Role::Employee)]
    #[case("supervisor", Role::Supervisor)]
    #[case("gerente", Role::Manager)]
    fn decodes_profile_roles(#[case] raw: &str, #[case] role: Role) {
        let row: ProfileRow = serde_json::from_value(json!({
            "id": "0b6c3f0e-2a35-4a84-a7b4-5f2a6c8d1e11",
            "name": "Ana",
            "email": "ana@loja.com",
            "type": raw,
            "department": "Vendas"
        }))
        .expect("row decodes");
        assert_eq!(row.into_domain().expect("valid user").role(), role);
    }

    #[rstest]
    fn patch_body_omits_absent_fields() {
        let patch = TaskPatch::status(TaskStatus::InProgress);
        let body = serde_json::to_value(TaskPatchBody::from(&patch)).expect("serialises");
        assert_eq!(body, json!({ "status": "em_andamento" }));
    }

    #[rstest]
    fn sign_up_metadata_uses_profile_column_names() {
        let form = NewUser::try_from_parts("Ana", "ana@loja.com", "segredo", Role::Supervisor, None)
            .expect("valid form");
        let body = serde_json::to_value(SignUpBody {
            email: form.email().as_ref(),
            password: form.password(),
            data: ProfileMetadata::from(&form),
        })
        .expect("serialises");
        assert_eq!(body["data"], json!({ "name": "Ana", "type": "supervisor" }));
    }

    #[rstest]
    fn sign_up_response_without_tokens_is_a_bare_user() {
        let decoded: SignUpResponseDto = serde_json::from_value(json!({
            "id": "0b6c3f0e-2a35-4a84-a7b4-5f2a6c8d1e11",
            "email": "ana@loja.com",
            "confirmation_sent_at": "2026-06-01T08:00:00Z"
        }))
        .expect("decodes");
        assert!(matches!(decoded, SignUpResponseDto::User(_)));
    }

    #[rstest]
    #[case(json!({ "error_code": "invalid_credentials", "msg": "Invalid login credentials" }), "Invalid login credentials")]
    #[case(json!({ "error": "invalid_grant", "error_description": "Email not confirmed" }), "Email not confirmed")]
    #[case(json!({ "code": "42501", "message": "permission denied" }), "permission denied")]
    fn error_text_prefers_the_most_specific_field(
        #[case] payload: serde_json::Value,
        #[case] expected: &str,
    ) {
        let dto: ApiErrorDto = serde_json::from_value(payload).expect("decodes");
        assert_eq!(dto.text(), Some(expected));
    }
}
