//! SQLite implementation of the `Session` unit-of-work port.
//!
//! Reads go through the reader pool; staged writes are buffered in memory and
//! flushed by `commit` inside a single transaction on the writer pool.

use contacts_core::session::{
    ContactFilter, QueryResult, Record, Select, Session, UserChange, UserFilter, UserPatch,
};
use contacts_types::contact::Contact;
use contacts_types::error::RepositoryError;
use contacts_types::user::User;
use sqlx::sqlite::SqliteConnection;
use sqlx::{QueryBuilder, Sqlite};

use super::pool::DatabasePool;
use super::rows::{format_date, format_datetime, ContactRow, UserRow};

#[derive(Debug)]
enum PendingWrite {
    Upsert(Record),
    Update(UserPatch),
    Delete(Contact),
}

/// One unit of work against the contactbook database.
///
/// Dropping a session with staged writes discards them.
pub struct SqliteSession {
    pool: DatabasePool,
    pending: Vec<PendingWrite>,
}

impl SqliteSession {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            pending: Vec::new(),
        }
    }

    /// Number of writes waiting for `commit`.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    async fn select_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, RepositoryError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM contacts WHERE user_id = ");
        query.push_bind(filter.owner().to_string());

        if let Some(id) = filter.id() {
            query.push(" AND id = ").push_bind(id.to_string());
        }
        if let Some(first_name) = filter.first_name() {
            query
                .push(" AND first_name = ")
                .push_bind(first_name.to_string())
                .push(" COLLATE NOCASE");
        }
        if let Some(last_name) = filter.last_name() {
            query
                .push(" AND last_name = ")
                .push_bind(last_name.to_string())
                .push(" COLLATE NOCASE");
        }
        if let Some(email) = filter.email() {
            query
                .push(" AND email = ")
                .push_bind(email.to_string())
                .push(" COLLATE NOCASE");
        }
        if let Some(window) = filter.birthdays() {
            query.push(" AND strftime('%m-%d', birthday) IN (");
            let mut keys = query.separated(", ");
            for key in window.month_days() {
                keys.push_bind(key);
            }
            query.push(")");
        }

        query.push(" ORDER BY rowid");

        match (filter.limit(), filter.offset()) {
            (Some(limit), offset) => {
                query.push(" LIMIT ").push_bind(limit);
                if let Some(offset) = offset {
                    query.push(" OFFSET ").push_bind(offset);
                }
            }
            (None, Some(offset)) => {
                query.push(" LIMIT -1 OFFSET ").push_bind(offset);
            }
            (None, None) => {}
        }

        let rows = query
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let mut contacts = Vec::with_capacity(rows.len());
        for row in &rows {
            let contact_row =
                ContactRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            contacts.push(contact_row.into_contact()?);
        }
        Ok(contacts)
    }

    async fn select_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE 1 = 1");

        if let Some(id) = filter.id {
            query.push(" AND id = ").push_bind(id.to_string());
        }
        if let Some(ref email) = filter.email {
            query
                .push(" AND email = ")
                .push_bind(email.trim().to_string())
                .push(" COLLATE NOCASE");
        }
        query.push(" ORDER BY rowid");

        let rows = query
            .build()
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        let mut users = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_row =
                UserRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            users.push(user_row.into_user()?);
        }
        Ok(users)
    }
}

impl Session for SqliteSession {
    async fn execute(&mut self, select: Select) -> Result<QueryResult, RepositoryError> {
        match select {
            Select::Contacts(filter) => {
                let contacts = self.select_contacts(&filter).await?;
                Ok(QueryResult::from_entities(contacts))
            }
            Select::Users(filter) => {
                let users = self.select_users(&filter).await?;
                Ok(QueryResult::from_entities(users))
            }
        }
    }

    fn add(&mut self, record: Record) {
        self.pending.push(PendingWrite::Upsert(record));
    }

    fn update(&mut self, patch: UserPatch) {
        self.pending.push(PendingWrite::Update(patch));
    }

    /// Accounts are never removed; staging a user delete is a query error.
    async fn delete(&mut self, record: Record) -> Result<(), RepositoryError> {
        match record {
            Record::Contact(contact) => {
                self.pending.push(PendingWrite::Delete(contact));
                Ok(())
            }
            Record::User(user) => Err(RepositoryError::Query(format!(
                "user '{}' cannot be deleted",
                user.id
            ))),
        }
    }

    async fn commit(&mut self) -> Result<(), RepositoryError> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_error)?;
        for write in &pending {
            match write {
                PendingWrite::Upsert(Record::Contact(contact)) => {
                    upsert_contact(&mut *tx, contact).await?
                }
                PendingWrite::Upsert(Record::User(user)) => upsert_user(&mut *tx, user).await?,
                PendingWrite::Update(patch) => update_user(&mut *tx, patch).await?,
                PendingWrite::Delete(contact) => delete_contact(&mut *tx, contact).await?,
            }
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::debug!(writes = pending.len(), "session committed");
        Ok(())
    }

    async fn refresh(&mut self, record: Record) -> Result<Record, RepositoryError> {
        let row = match &record {
            Record::Contact(contact) => sqlx::query("SELECT * FROM contacts WHERE id = ?")
                .bind(contact.id.to_string())
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(map_sqlx_error)?
                .map(|row| -> Result<Record, RepositoryError> {
                    let contact_row = ContactRow::from_row(&row)
                        .map_err(|e| RepositoryError::Query(e.to_string()))?;
                    Ok(Record::Contact(contact_row.into_contact()?))
                }),
            Record::User(user) => sqlx::query("SELECT * FROM users WHERE id = ?")
                .bind(user.id.to_string())
                .fetch_optional(&self.pool.reader)
                .await
                .map_err(map_sqlx_error)?
                .map(|row| -> Result<Record, RepositoryError> {
                    let user_row =
                        UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                    Ok(Record::User(user_row.into_user()?))
                }),
        };

        row.ok_or(RepositoryError::NotFound)?
    }
}

async fn upsert_contact(conn: &mut SqliteConnection, contact: &Contact) -> Result<(), RepositoryError> {
    // The owner of an existing row never changes.
    let result = sqlx::query(
        "INSERT INTO contacts (id, user_id, first_name, last_name, email, phone_number, birthday, extra_data, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             first_name = excluded.first_name,
             last_name = excluded.last_name,
             email = excluded.email,
             phone_number = excluded.phone_number,
             birthday = excluded.birthday,
             extra_data = excluded.extra_data,
             updated_at = excluded.updated_at
         WHERE contacts.user_id = excluded.user_id",
    )
    .bind(contact.id.to_string())
    .bind(contact.user_id.to_string())
    .bind(&contact.first_name)
    .bind(&contact.last_name)
    .bind(&contact.email)
    .bind(&contact.phone_number)
    .bind(format_date(&contact.birthday))
    .bind(&contact.extra_data)
    .bind(format_datetime(&contact.created_at))
    .bind(format_datetime(&contact.updated_at))
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::Conflict(format!(
            "contact '{}' belongs to another user",
            contact.id
        )));
    }
    Ok(())
}

async fn upsert_user(conn: &mut SqliteConnection, user: &User) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "INSERT INTO users (id, username, email, password, confirmed, refresh_token, avatar, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
             username = excluded.username,
             email = excluded.email,
             password = excluded.password,
             confirmed = excluded.confirmed,
             refresh_token = excluded.refresh_token,
             avatar = excluded.avatar,
             updated_at = excluded.updated_at",
    )
    .bind(user.id.to_string())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.confirmed)
    .bind(&user.refresh_token)
    .bind(&user.avatar)
    .bind(format_datetime(&user.created_at))
    .bind(format_datetime(&user.updated_at))
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
            RepositoryError::Conflict(format!("email '{}' is already registered", user.email)),
        ),
        Err(e) => Err(map_sqlx_error(e)),
    }
}

async fn delete_contact(conn: &mut SqliteConnection, contact: &Contact) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ? AND user_id = ?")
        .bind(contact.id.to_string())
        .bind(contact.user_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Write the single column named by `patch`, plus `updated_at`.
async fn update_user(conn: &mut SqliteConnection, patch: &UserPatch) -> Result<(), RepositoryError> {
    let query = match &patch.change {
        UserChange::RefreshToken(token) => {
            sqlx::query("UPDATE users SET refresh_token = ?, updated_at = ? WHERE id = ?").bind(token)
        }
        UserChange::Password(password) => {
            sqlx::query("UPDATE users SET password = ?, updated_at = ? WHERE id = ?").bind(password)
        }
        UserChange::Confirmed(confirmed) => {
            sqlx::query("UPDATE users SET confirmed = ?, updated_at = ? WHERE id = ?").bind(*confirmed)
        }
        UserChange::Avatar(avatar) => {
            sqlx::query("UPDATE users SET avatar = ?, updated_at = ? WHERE id = ?").bind(avatar)
        }
    };

    let result = query
        .bind(format_datetime(&patch.updated_at))
        .bind(patch.id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
            RepositoryError::Conflict(db_err.message().to_string())
        }
        e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
            tracing::warn!(error = %e, "database unavailable");
            RepositoryError::Connection
        }
        e => RepositoryError::Query(e.to_string()),
    }
}
