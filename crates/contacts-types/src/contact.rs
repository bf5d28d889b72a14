use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::user::UserId;
use crate::validate;

/// Unique identifier for a contact, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactId(pub Uuid);

impl ContactId {
    /// Create a new ContactId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a ContactId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An address-book entry.
///
/// Every contact belongs to exactly one user (`user_id`) and is only ever
/// read or written through that owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Date of birth. Only month and day matter for birthday lookups.
    pub birthday: NaiveDate,
    /// Free-form notes.
    pub extra_data: Option<String>,
    /// Owning user.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Build a new contact owned by `owner` from validated input.
    pub fn from_schema(body: &ContactSchema, owner: UserId) -> Self {
        let now = Utc::now();
        let mut contact = Self {
            id: ContactId::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            birthday: body.birthday,
            extra_data: None,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        contact.apply(body);
        contact
    }

    /// Overwrite every mutable field from `body`. Identity, ownership and
    /// timestamps are left alone.
    pub fn apply(&mut self, body: &ContactSchema) {
        self.first_name = body.first_name.clone();
        self.last_name = body.last_name.clone();
        self.email = body.email.clone();
        self.phone_number = body.phone_number.clone();
        self.birthday = body.birthday;
        self.extra_data = body.extra_data.clone();
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create/update input for a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSchema {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub extra_data: Option<String>,
}

impl ContactSchema {
    /// Check field constraints against `today` (birthdays may not lie in the future).
    pub fn validate(&self, today: NaiveDate) -> Result<(), SchemaError> {
        validate::char_range("first_name", self.first_name.trim(), 1, 50)?;
        validate::char_range("last_name", self.last_name.trim(), 1, 50)?;
        validate::email("email", &self.email)?;
        validate::phone_number("phone_number", &self.phone_number)?;
        if self.birthday > today {
            return Err(SchemaError::invalid("birthday", "cannot be in the future"));
        }
        if let Some(extra) = &self.extra_data {
            validate::max_chars("extra_data", extra, 250)?;
        }
        Ok(())
    }
}
