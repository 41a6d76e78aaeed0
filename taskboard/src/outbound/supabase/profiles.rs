//! PostgREST adapter for the `profiles` table.

use async_trait::async_trait;
use reqwest::{Method, Url};

use super::client::{CallError, SupabaseClient};
use super::dto::ProfileRow;
use super::errors::map_profile_failure;
use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{EmailAddress, User, UserId};

const PROFILES_PATH: &str = "/rest/v1/profiles";

/// Profile repository over PostgREST.
#[derive(Clone)]
pub struct SupabaseProfiles {
    client: SupabaseClient,
}

impl SupabaseProfiles {
    /// Wrap the shared client.
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn url(&self) -> Result<Url, ProfileRepositoryError> {
        let mut url = self.client.endpoint(PROFILES_PATH).map_err(map_call_error)?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<Vec<User>, ProfileRepositoryError> {
        let request = self.client.request(Method::GET, url);
        let body = self.client.send(request).await.map_err(map_call_error)?;
        decode_rows(&body)
    }

    async fn fetch_one(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<User>, ProfileRepositoryError> {
        let mut url = self.url()?;
        url.query_pairs_mut()
            .append_pair(column, &format!("eq.{value}"))
            .append_pair("limit", "1");
        Ok(self.fetch(url).await?.into_iter().next())
    }
}

fn map_call_error(error: CallError) -> ProfileRepositoryError {
    match error {
        CallError::Transport(message) | CallError::Url(message) => {
            ProfileRepositoryError::connection(message)
        }
        CallError::Api(failure) => map_profile_failure(failure),
    }
}

fn decode_rows(body: &[u8]) -> Result<Vec<User>, ProfileRepositoryError> {
    let rows: Vec<ProfileRow> = serde_json::from_slice(body).map_err(|err| {
        ProfileRepositoryError::decode(format!("invalid profiles payload: {err}"))
    })?;
    rows.into_iter()
        .map(ProfileRow::into_domain)
        .collect::<Result<_, _>>()
        .map_err(ProfileRepositoryError::decode)
}

#[async_trait]
impl ProfileRepository for SupabaseProfiles {
    async fn list_ordered_by_name(&self) -> Result<Vec<User>, ProfileRepositoryError> {
        let mut url = self.url()?;
        url.query_pairs_mut().append_pair("order", "name.asc");
        self.fetch(url).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, ProfileRepositoryError> {
        self.fetch_one("id", id.as_ref()).await
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, ProfileRepositoryError> {
        self.fetch_one("email", email.as_ref()).await
    }
}
