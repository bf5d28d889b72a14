use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::validate;

/// Unique identifier for a user account, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new UserId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A registered account. Owns zero or more contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Unique (case-insensitive) login identifier.
    pub email: String,
    /// Stored credential. Hashed before it reaches this layer.
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Flips to true once the email address has been confirmed.
    pub confirmed: bool,
    /// Current refresh token, rotated on login and cleared on logout.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh, unconfirmed account from validated registration input.
    pub fn from_schema(body: &UserSchema, avatar: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: body.username.clone(),
            email: body.email.clone(),
            password: body.password.clone(),
            confirmed: false,
            refresh_token: None,
            avatar,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSchema {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl UserSchema {
    /// Check field constraints before the schema reaches a repository.
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate::char_range("username", self.username.trim(), 3, 50)?;
        validate::email("email", &self.email)?;
        validate::char_range("password", &self.password, 6, 128)?;
        Ok(())
    }
}
