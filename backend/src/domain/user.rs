//! Trainer and client accounts.
//!
//! A trainer owns a set of client references; a client holds at most one
//! trainer reference. The two sides are written by the roster service and
//! must agree: a client's trainer must list that client.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Trainer,
    Client,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trainer => "trainer",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`UserRole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUserRoleError {
    pub input: String,
}

impl fmt::Display for ParseUserRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid user role: {}", self.input)
    }
}

impl std::error::Error for ParseUserRoleError {}

impl FromStr for UserRole {
    type Err = ParseUserRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "trainer" => Ok(Self::Trainer),
            "client" => Ok(Self::Client),
            _ => Err(ParseUserRoleError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Validation errors returned by [`User::new`] and [`EmailAddress::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    InvalidEmail,
    TrainerWithTrainer,
    ClientWithClients,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::InvalidEmail => write!(f, "email address is malformed"),
            Self::TrainerWithTrainer => write!(f, "a trainer cannot be assigned a trainer"),
            Self::ClientWithClients => write!(f, "a client cannot manage other clients"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Normalised email address used as the unique login handle.
///
/// Addresses are trimmed and lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
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

/// Input payload for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
    pub role: UserRole,
    /// Trainer managing this account; clients only.
    pub trainer_id: Option<UserId>,
    /// Clients managed by this account; trainers only.
    pub client_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
    role: UserRole,
    trainer_id: Option<UserId>,
    client_ids: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Validate a draft into a user.
    pub fn new(draft: UserDraft) -> Result<Self, UserValidationError> {
        let UserDraft {
            id,
            name,
            email,
            role,
            trainer_id,
            client_ids,
            created_at,
            updated_at,
        } = draft;

        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        match role {
            UserRole::Trainer if trainer_id.is_some() => {
                return Err(UserValidationError::TrainerWithTrainer);
            }
            UserRole::Client if !client_ids.is_empty() => {
                return Err(UserValidationError::ClientWithClients);
            }
            _ => {}
        }

        Ok(Self {
            id,
            name,
            email,
            role,
            trainer_id,
            client_ids,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn trainer_id(&self) -> Option<UserId> {
        self.trainer_id
    }

    pub fn client_ids(&self) -> &[UserId] {
        self.client_ids.as_slice()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when this account lists `client_id` among its clients.
    pub fn manages(&self, client_id: &UserId) -> bool {
        self.client_ids.contains(client_id)
    }

    /// True when `trainer_id` is this client's trainer.
    pub fn is_managed_by(&self, trainer_id: &UserId) -> bool {
        self.role == UserRole::Client && self.trainer_id.as_ref() == Some(trainer_id)
    }

    /// Return this client with its trainer reference set.
    pub(crate) fn with_trainer(mut self, trainer_id: UserId, now: DateTime<Utc>) -> Self {
        self.trainer_id = Some(trainer_id);
        self.updated_at = now;
        self
    }
}
