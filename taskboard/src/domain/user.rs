//! User data model: identifiers, roles and the account creation form.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Minimum accepted password length for new accounts.
pub const PASSWORD_MIN: usize = 6;

/// Departments offered by the account creation form.
///
/// The backend stores the department as free text, so values outside this
/// list are accepted when decoding profiles.
pub const KNOWN_DEPARTMENTS: [&str; 6] = [
    "Vendas",
    "Estoque",
    "Gestão",
    "Administração",
    "Atendimento",
    "Marketing",
];

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id is blank.
    EmptyId,
    /// The id is not a UUID.
    InvalidId,
    /// The name is blank.
    EmptyName,
    /// The email is blank.
    EmptyEmail,
    /// The email is malformed.
    InvalidEmail,
    /// The password is blank.
    EmptyPassword,
    /// The password is shorter than `min` characters.
    PasswordTooShort { min: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name is required"),
            Self::EmptyEmail => write!(f, "email is required"),
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPassword => write!(f, "password is required"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role of a user; decides the dashboard and the mutation permissions.
///
/// Serialised with the backend's stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Works on assigned tasks.
    #[serde(rename = "funcionario")]
    Employee,
    /// Assigns and follows up on tasks.
    #[serde(rename = "supervisor")]
    Supervisor,
    /// Assigns tasks and manages accounts.
    #[serde(rename = "gerente")]
    Manager,
}

/// Error returned when parsing a role from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl Role {
    /// All roles in display order.
    pub const ALL: [Self; 3] = [Self::Employee, Self::Supervisor, Self::Manager];

    /// Value stored in the `profiles.type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "funcionario",
            Self::Supervisor => "supervisor",
            Self::Manager => "gerente",
        }
    }

    /// Label shown next to the signed-in user's name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Employee => "Funcionário",
            Self::Supervisor => "Supervisor",
            Self::Manager => "Gerente",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown user role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "funcionario" => Ok(Self::Employee),
            "supervisor" => Ok(Self::Supervisor),
            "gerente" => Ok(Self::Manager),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address accepted by the account forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`]; surrounding whitespace is trimmed.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user as stored in the `profiles` table.
///
/// ## Invariants
/// - `name` is non-empty once trimmed.
/// - `department`, when present, is non-empty once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    department: Option<String>,
}

impl User {
    /// Build a user, rejecting a blank name.
    ///
    /// Email addresses stored by the backend are not re-validated so that
    /// legacy rows still load.
    pub fn try_new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        department: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            email: email.into(),
            role,
            department: normalise_department(department),
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address used to sign in.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Role of the user.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Optional department.
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Whether the user holds the manager role.
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

fn normalise_department(department: Option<String>) -> Option<String> {
    department
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Validated account creation form.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `password` has at least [`PASSWORD_MIN`] characters and never appears
///   in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: EmailAddress,
    password: Zeroizing<String>,
    role: Role,
    department: Option<String>,
}

impl NewUser {
    /// Validate raw form values.
    ///
    /// # Examples
    /// ```
    /// use taskboard::domain::{NewUser, Role};
    ///
    /// let form = NewUser::try_from_parts("Ana", "ana@loja.com", "segredo", Role::Employee, Some("Vendas"))
    ///     .unwrap();
    /// assert_eq!(form.email().as_ref(), "ana@loja.com");
    /// ```
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        department: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }

        Ok(Self {
            name: name.to_owned(),
            email,
            password: Zeroizing::new(password.to_owned()),
            role,
            department: normalise_department(department.map(str::to_owned)),
        })
    }

    /// Display name for the new profile.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Sign-in email for the new account.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Initial password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role of the new account.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Optional department.
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("department", &self.department)
            .finish()
    }
}
