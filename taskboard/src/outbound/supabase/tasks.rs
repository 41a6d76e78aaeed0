//! PostgREST adapter for the `tasks` table.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{CallError, SupabaseClient};
use super::dto::{TaskInsertBody, TaskPatchBody, TaskRow};
use super::errors::map_task_failure;
use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::{Task, TaskId, TaskInsert, TaskPatch};

const TASKS_PATH: &str = "/rest/v1/tasks";

/// Task repository over PostgREST.
#[derive(Clone)]
pub struct SupabaseTasks {
    client: SupabaseClient,
}

impl SupabaseTasks {
    /// Wrap the shared client.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

fn map_call_error(error: CallError) -> TaskRepositoryError {
    match error {
        CallError::Transport(message) | CallError::Url(message) => {
            TaskRepositoryError::connection(message)
        }
        CallError::Api(failure) => map_task_failure(failure),
    }
}

fn decode_rows(body: &[u8]) -> Result<Vec<Task>, TaskRepositoryError> {
    let rows: Vec<TaskRow> = serde_json::from_slice(body)
        .map_err(|err| TaskRepositoryError::decode(format!("invalid tasks payload: {err}")))?;
    rows.into_iter()
        .map(TaskRow::into_domain)
        .collect::<Result<_, _>>()
        .map_err(TaskRepositoryError::decode)
}

#[async_trait]
impl TaskRepository for SupabaseTasks {
    async fn list_recent_first(&self) -> Result<Vec<Task>, TaskRepositoryError> {
        let mut url = self.client.endpoint(TASKS_PATH).map_err(map_call_error)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        let request = self.client.request(Method::GET, url);
        let body = self.client.send(request).await.map_err(map_call_error)?;
        decode_rows(&body)
    }

    async fn insert(&self, task: &TaskInsert) -> Result<Task, TaskRepositoryError> {
        let mut url = self.client.endpoint(TASKS_PATH).map_err(map_call_error)?;
        url.query_pairs_mut().append_pair("select", "*");
        let request = self
            .client
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&TaskInsertBody::from(task));
        let body = self.client.send(request).await.map_err(map_call_error)?;
        decode_rows(&body)?
            .into_iter()
            .next()
            .ok_or_else(|| TaskRepositoryError::decode("insert returned no row"))
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), TaskRepositoryError> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut url = self.client.endpoint(TASKS_PATH).map_err(map_call_error)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        let request = self
            .client
            .request(Method::PATCH, url)
            .header("Prefer", "return=minimal")
            .json(&TaskPatchBody::from(patch));
        self.client.send(request).await.map_err(map_call_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for payload decoding.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_listing_decodes() {
        assert!(decode_rows(b"[]").expect("decodes").is_empty());
    }

    #[rstest]
    fn object_payload_is_a_decode_error() {
        assert!(matches!(
            decode_rows(br#"{"message":"unexpected"}"#),
            Err(TaskRepositoryError::Decode { .. })
        ));
    }
}
