//! Session trait definition (port).
//!
//! A `Session` is one unit of work against the database: it runs typed
//! queries, stages writes and flushes them on `commit`. The repository
//! functions in this crate are written against this trait only; the SQLite
//! implementation lives in contacts-infra and tests use an in-memory double.

pub mod select;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{DateTime, Utc};
use contacts_types::contact::Contact;
use contacts_types::error::RepositoryError;
use contacts_types::user::{User, UserId};

pub use select::{ContactFilter, Select, UserFilter};

/// A stored row of any entity kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Contact(Contact),
    User(User),
}

impl Record {
    /// Entity kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Contact(_) => "contact",
            Record::User(_) => "user",
        }
    }
}

impl From<Contact> for Record {
    fn from(contact: Contact) -> Self {
        Record::Contact(contact)
    }
}

impl From<User> for Record {
    fn from(user: User) -> Self {
        Record::User(user)
    }
}

/// An entity type that can travel through a session as a [`Record`].
pub trait Entity: Sized + Clone + Send + Sync + 'static {
    const KIND: &'static str;

    fn into_record(self) -> Record;

    /// Returns `None` when the record holds a different entity kind.
    fn from_record(record: Record) -> Option<Self>;
}

impl Entity for Contact {
    const KIND: &'static str = "contact";

    fn into_record(self) -> Record {
        Record::Contact(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Contact(contact) => Some(contact),
            _ => None,
        }
    }
}

impl Entity for User {
    const KIND: &'static str = "user";

    fn into_record(self) -> Record {
        Record::User(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::User(user) => Some(user),
            _ => None,
        }
    }
}

/// A single user column to overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChange {
    RefreshToken(Option<String>),
    Password(String),
    Confirmed(bool),
    Avatar(Option<String>),
}

/// Targeted update of one stored user, staged with [`Session::update`].
///
/// Only the named column and `updated_at` are written, so columns changed
/// by other sessions since the user was loaded are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    pub id: UserId,
    pub change: UserChange,
    pub updated_at: DateTime<Utc>,
}

impl UserPatch {
    pub fn new(id: UserId, change: UserChange) -> Self {
        Self {
            id,
            change,
            updated_at: Utc::now(),
        }
    }

    /// Mirror the patch onto an in-memory copy of the user.
    pub fn apply_to(&self, user: &mut User) {
        match &self.change {
            UserChange::RefreshToken(token) => user.refresh_token = token.clone(),
            UserChange::Password(password) => user.password = password.clone(),
            UserChange::Confirmed(confirmed) => user.confirmed = *confirmed,
            UserChange::Avatar(avatar) => user.avatar = avatar.clone(),
        }
        user.updated_at = self.updated_at;
    }
}

fn expect_kind<E: Entity>(record: Record) -> Result<E, RepositoryError> {
    let found = record.kind();
    E::from_record(record).ok_or_else(|| {
        RepositoryError::Query(format!("expected a {} row, got a {found} row", E::KIND))
    })
}

/// Rows returned by [`Session::execute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    records: Vec<Record>,
}

impl QueryResult {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entities<E: Entity>(entities: impl IntoIterator<Item = E>) -> Self {
        Self::new(entities.into_iter().map(Entity::into_record).collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// At most one row: `Ok(None)` for zero rows, an error for more than one.
    pub fn scalar_one_or_none<E: Entity>(self) -> Result<Option<E>, RepositoryError> {
        let mut records = self.records.into_iter();
        let Some(first) = records.next() else {
            return Ok(None);
        };
        if records.next().is_some() {
            return Err(RepositoryError::MultipleRows);
        }
        expect_kind(first).map(Some)
    }

    /// Every row, in the order the session returned them.
    pub fn scalars<E: Entity>(self) -> Result<Vec<E>, RepositoryError> {
        self.records.into_iter().map(expect_kind).collect()
    }
}

/// Unit-of-work port.
///
/// Writes staged with `add`/`update`/`delete` are invisible to `execute` until
/// `commit` succeeds. A session dropped without committing discards them,
/// and a failed commit discards the staged batch. Sessions are opened and
/// closed by the caller; repository functions only borrow them.
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait Session: Send {
    /// Run a read query.
    fn execute(
        &mut self,
        select: Select,
    ) -> impl std::future::Future<Output = Result<QueryResult, RepositoryError>> + Send;

    /// Stage a record for insertion, or for overwriting the stored row with the same id.
    fn add(&mut self, record: Record);

    /// Stage a single-column update of a stored user.
    fn update(&mut self, patch: UserPatch);

    /// Stage a record for deletion.
    fn delete(
        &mut self,
        record: Record,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Flush all staged writes atomically.
    fn commit(&mut self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Reload a record from storage.
    fn refresh(
        &mut self,
        record: Record,
    ) -> impl std::future::Future<Output = Result<Record, RepositoryError>> + Send;
}

/// Typed wrapper around [`Session::refresh`].
pub async fn refresh<S: Session, E: Entity>(session: &mut S, entity: E) -> Result<E, RepositoryError> {
    let record = session.refresh(entity.into_record()).await?;
    expect_kind(record)
}
