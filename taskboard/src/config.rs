//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from `TASKBOARD_*` environment variables or a configuration
//! file. Command-line flags belong to the CLI, so settings are loaded from an
//! argument list holding only the program name.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::RetryPolicy;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable compact lines.
    Text,
}

/// Settings validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The configuration sources could not be read or merged.
    #[error("failed to load settings: {0}")]
    Load(String),
    /// A required value is absent.
    #[error("missing required setting {0}")]
    Missing(&'static str),
    /// The project URL is not a valid absolute URL.
    #[error("invalid supabase_url {value:?}: {message}")]
    InvalidUrl { value: String, message: String },
    /// The log format is neither `json` nor `text`.
    #[error("unknown log_format {0:?}; expected json or text")]
    UnknownLogFormat(String),
}

/// Connection values needed to build the Supabase client.
#[derive(Debug, Clone)]
pub struct SupabaseConnection {
    /// Project base URL.
    pub url: Url,
    /// Public anon key.
    pub anon_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Configuration for the task board client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TASKBOARD")]
pub struct AppSettings {
    /// Supabase project URL, e.g. `https://abc.supabase.co`.
    pub supabase_url: Option<String>,
    /// Public anon key used for every request.
    pub supabase_anon_key: Option<String>,
    /// Optional service-role key enabling admin account creation.
    pub supabase_service_role_key: Option<String>,
    /// HTTP request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Profile lookups retried after the first one.
    #[ortho_config(default = 3)]
    pub profile_retry_attempts: u32,
    /// Pause between profile lookups in milliseconds.
    #[ortho_config(default = 1000)]
    pub profile_retry_delay_ms: u64,
    /// Pause after a sign-up before revoking its session, in milliseconds.
    #[ortho_config(default = 1500)]
    pub account_settle_delay_ms: u64,
    /// `json` (default) or `text`.
    pub log_format: Option<String>,
}

impl AppSettings {
    /// Load settings from the environment and configuration files only.
    pub fn load_ambient() -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from(env!("CARGO_PKG_NAME"))])
            .map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Validated connection values.
    pub fn connection(&self) -> Result<SupabaseConnection, SettingsError> {
        let raw = self
            .supabase_url
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(SettingsError::Missing("supabase_url"))?;
        let url = Url::parse(raw.trim()).map_err(|err| SettingsError::InvalidUrl {
            value: raw.to_owned(),
            message: err.to_string(),
        })?;
        let anon_key = self
            .supabase_anon_key
            .clone()
            .filter(|value| !value.trim().is_empty())
            .ok_or(SettingsError::Missing("supabase_anon_key"))?;
        Ok(SupabaseConnection {
            url,
            anon_key,
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }

    /// Service-role key, when one is configured.
    pub fn service_role_key(&self) -> Option<&str> {
        self.supabase_service_role_key
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Retry policy for profile resolution.
    pub fn profile_retry(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.profile_retry_attempts,
            delay: Duration::from_millis(self.profile_retry_delay_ms),
        }
    }

    /// Settle delay used by the sign-up provisioner.
    pub fn account_settle_delay(&self) -> Duration {
        Duration::from_millis(self.account_settle_delay_ms)
    }

    /// Parsed log format.
    pub fn log_format(&self) -> Result<LogFormat, SettingsError> {
        match self.log_format.as_deref().map(str::trim) {
            None | Some("") => Ok(LogFormat::Json),
            Some(value) if value.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
            Some(value) if value.eq_ignore_ascii_case("text") => Ok(LogFormat::Text),
            Some(other) => Err(SettingsError::UnknownLogFormat(other.to_owned())),
        }
    }
}
