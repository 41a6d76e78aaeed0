//! Authentication primitives: credentials, identities and auth-state events.
//!
//! Keep inbound parsing outside the domain by exposing constructors that
//! validate string inputs before a store talks to the auth port.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::UserId;

/// Domain error returned when login values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the auth port.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use taskboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" gerente@loja.com ", "123456").unwrap();
/// assert_eq!(creds.email(), "gerente@loja.com");
/// assert_eq!(creds.password(), "123456");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used as the sign-in identifier.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity of an authenticated account as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Account id; equals the linked profile id.
    pub user_id: UserId,
    /// Email attached to the account, when the service reports one.
    pub email: Option<String>,
}

/// Opaque access token of a session issued by the auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedSession {
    identity: AuthIdentity,
    access_token: Zeroizing<String>,
    refresh_token: Option<Zeroizing<String>>,
}

impl IssuedSession {
    /// Wrap the tokens returned by the auth service.
    pub fn new(identity: AuthIdentity, access_token: impl Into<String>) -> Self {
        Self {
            identity,
            access_token: Zeroizing::new(access_token.into()),
            refresh_token: None,
        }
    }

    /// Attach the refresh token issued alongside the access token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(Zeroizing::new(refresh_token.into()));
        self
    }

    /// Account the session belongs to.
    pub fn identity(&self) -> &AuthIdentity {
        &self.identity
    }

    /// Bearer token for authenticated requests.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Refresh token, when the service issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|token| token.as_str())
    }
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("identity", &self.identity)
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Result of a sign-up call.
///
/// `session` is absent when the service requires email confirmation before
/// issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// The newly created account.
    pub identity: AuthIdentity,
    /// Session issued for the new account, if any.
    pub session: Option<IssuedSession>,
}

/// Auth-state change broadcast by the auth port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session became active for this account.
    SignedIn(AuthIdentity),
    /// The active session ended.
    SignedOut,
}

/// Classification of a failed sign-in, each with its own notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    /// The account exists but its email was never confirmed.
    EmailNotConfirmed,
    /// Email or password did not match.
    InvalidCredentials,
    /// Anything else, carrying the service message.
    Other(String),
}
