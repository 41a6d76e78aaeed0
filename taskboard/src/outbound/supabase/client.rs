//! Shared HTTP client holding the project URL, API key and active session.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url, header};
use tokio::sync::broadcast;
use tracing::debug;
use zeroize::Zeroizing;

use super::errors::{ApiFailure, describe_transport_error};
use crate::domain::{AuthEvent, IssuedSession};

const USER_AGENT: &str = concat!("taskboard/", env!("CARGO_PKG_VERSION"));
const AUTH_EVENT_CAPACITY: usize = 16;

/// Failure of a single round trip, before port-specific mapping.
#[derive(Debug)]
pub(super) enum CallError {
    /// The request never produced a response.
    Transport(String),
    /// The service answered with a non-success status.
    Api(ApiFailure),
    /// A URL could not be built from the project base.
    Url(String),
}

struct Inner {
    http: Client,
    base: Url,
    anon_key: Zeroizing<String>,
    session: RwLock<Option<IssuedSession>>,
    events: broadcast::Sender<AuthEvent>,
}

/// Cheaply cloneable handle shared by every Supabase adapter.
///
/// Data requests carry the active session's access token so row-level
/// security sees the signed-in user; without a session they use the anon key.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<Inner>,
}

impl SupabaseClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base,
                anon_key: Zeroizing::new(anon_key.into()),
                session: RwLock::new(None),
                events,
            }),
        })
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url, CallError> {
        self.inner
            .base
            .join(path)
            .map_err(|err| CallError::Url(format!("{path}: {err}")))
    }

    /// Request authorised with the active session, or the anon key.
    pub(super) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        match self.active_session() {
            Some(session) => self.request_with_bearer(method, url, session.access_token()),
            None => self.anonymous_request(method, url),
        }
    }

    /// Request authorised with the anon key regardless of the active session.
    pub(super) fn anonymous_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request_with_bearer(method, url, self.inner.anon_key.as_str())
    }

    pub(super) fn request_with_bearer(
        &self,
        method: Method,
        url: Url,
        bearer: &str,
    ) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header("apikey", self.inner.anon_key.as_str())
            .bearer_auth(bearer)
            .header(header::ACCEPT, "application/json")
    }

    /// Send a request and return the body of a successful response.
    pub(super) async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, CallError> {
        let response = request
            .send()
            .await
            .map_err(|err| CallError::Transport(describe_transport_error(&err)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| CallError::Transport(describe_transport_error(&err)))?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "supabase call failed");
            return Err(CallError::Api(ApiFailure::from_response(status, body.as_ref())));
        }
        Ok(body.to_vec())
    }

    pub(super) fn active_session(&self) -> Option<IssuedSession> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(super) fn replace_session(&self, session: Option<IssuedSession>) {
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub(super) fn emit(&self, event: AuthEvent) {
        if self.inner.events.send(event).is_err() {
            debug!("no auth listeners registered");
        }
    }

    pub(super) fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }
}
