//! Row types mapping SQLite rows to domain entities.

use chrono::{DateTime, NaiveDate, Utc};
use contacts_types::contact::{Contact, ContactId};
use contacts_types::error::RepositoryError;
use contacts_types::user::{User, UserId};
use sqlx::Row;

pub(crate) struct ContactRow {
    id: String,
    user_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    birthday: String,
    extra_data: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ContactRow {
    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone_number: row.try_get("phone_number")?,
            birthday: row.try_get("birthday")?,
            extra_data: row.try_get("extra_data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    pub(crate) fn into_contact(self) -> Result<Contact, RepositoryError> {
        let id = self
            .id
            .parse::<ContactId>()
            .map_err(|e| RepositoryError::Query(format!("invalid contact id: {e}")))?;
        let user_id = parse_user_id(&self.user_id)?;

        Ok(Contact {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            birthday: parse_date(&self.birthday)?,
            extra_data: self.extra_data,
            user_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

pub(crate) struct UserRow {
    id: String,
    username: String,
    email: String,
    password: String,
    confirmed: bool,
    refresh_token: Option<String>,
    avatar: Option<String>,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            confirmed: row.try_get("confirmed")?,
            refresh_token: row.try_get("refresh_token")?,
            avatar: row.try_get("avatar")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: parse_user_id(&self.id)?,
            username: self.username,
            email: self.email,
            password: self.password,
            confirmed: self.confirmed,
            refresh_token: self.refresh_token,
            avatar: self.avatar,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_user_id(s: &str) -> Result<UserId, RepositoryError> {
    s.parse::<UserId>()
        .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| RepositoryError::Query(format!("invalid date: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
