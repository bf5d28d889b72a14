//! Contact repository.
//!
//! Every query is scoped to the acting user through
//! [`ContactFilter::owned_by`]; a contact owned by someone else behaves
//! exactly like a missing one.

use chrono::Utc;
use contacts_types::contact::{Contact, ContactId, ContactSchema};
use contacts_types::error::RepositoryError;
use contacts_types::user::User;

use crate::birthday::{BirthdayWindow, DEFAULT_WINDOW_DAYS};
use crate::session::{refresh, ContactFilter, Select, Session};

pub use crate::birthday::{days_to_birthday, days_to_birthday_from};

/// One page of the user's contacts, in storage order.
#[tracing::instrument(name = "get_contacts", skip(session, user), fields(user_id = %user.id))]
pub async fn get_contacts<S: Session>(
    limit: i64,
    offset: i64,
    session: &mut S,
    user: &User,
) -> Result<Vec<Contact>, RepositoryError> {
    let filter = ContactFilter::owned_by(user).paginate(limit, offset);
    session.execute(Select::Contacts(filter)).await?.scalars()
}

/// The user's contact with the given id, if any.
#[tracing::instrument(name = "get_contact", skip(session, user), fields(user_id = %user.id))]
pub async fn get_contact<S: Session>(
    id: &ContactId,
    session: &mut S,
    user: &User,
) -> Result<Option<Contact>, RepositoryError> {
    let filter = ContactFilter::owned_by(user).with_id(*id);
    session
        .execute(Select::Contacts(filter))
        .await?
        .scalar_one_or_none()
}

/// Persist a new contact owned by `user`.
#[tracing::instrument(name = "create_contact", skip(body, session, user), fields(user_id = %user.id))]
pub async fn create_contact<S: Session>(
    body: &ContactSchema,
    session: &mut S,
    user: &User,
) -> Result<Contact, RepositoryError> {
    let contact = Contact::from_schema(body, user.id);
    session.add(contact.clone().into());
    session.commit().await?;
    tracing::debug!(contact_id = %contact.id, "contact created");
    refresh(session, contact).await
}

/// Overwrite every field of the user's contact `id` from `body`.
///
/// Returns `Ok(None)` without writing anything when the contact does not
/// exist or belongs to another user.
#[tracing::instrument(name = "update_contact", skip(body, session, user), fields(user_id = %user.id))]
pub async fn update_contact<S: Session>(
    body: &ContactSchema,
    id: &ContactId,
    session: &mut S,
    user: &User,
) -> Result<Option<Contact>, RepositoryError> {
    let Some(mut contact) = get_contact(id, session, user).await? else {
        return Ok(None);
    };

    contact.apply(body);
    contact.updated_at = Utc::now();

    session.add(contact.clone().into());
    session.commit().await?;
    tracing::debug!(contact_id = %contact.id, "contact updated");
    refresh(session, contact).await.map(Some)
}

/// Remove the user's contact `id` and return it.
///
/// Returns `Ok(None)` when there is nothing to delete, so deleting twice is harmless.
#[tracing::instrument(name = "delete_contact", skip(session, user), fields(user_id = %user.id))]
pub async fn delete_contact<S: Session>(
    id: &ContactId,
    session: &mut S,
    user: &User,
) -> Result<Option<Contact>, RepositoryError> {
    let Some(contact) = get_contact(id, session, user).await? else {
        return Ok(None);
    };

    session.delete(contact.clone().into()).await?;
    session.commit().await?;
    tracing::debug!(contact_id = %contact.id, "contact deleted");
    Ok(Some(contact))
}

/// The user's contacts matching every supplied criterion.
///
/// Each criterion is a case-insensitive exact match; `None` criteria are
/// ignored, so passing none returns all of the user's contacts.
#[tracing::instrument(name = "search_contacts", skip(session, user), fields(user_id = %user.id))]
pub async fn search_contacts<S: Session>(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
    session: &mut S,
    user: &User,
) -> Result<Vec<Contact>, RepositoryError> {
    let mut filter = ContactFilter::owned_by(user);
    if let Some(first_name) = first_name {
        filter = filter.with_first_name(first_name);
    }
    if let Some(last_name) = last_name {
        filter = filter.with_last_name(last_name);
    }
    if let Some(email) = email {
        filter = filter.with_email(email);
    }
    session.execute(Select::Contacts(filter)).await?.scalars()
}

/// The user's contacts celebrating a birthday in the next
/// [`DEFAULT_WINDOW_DAYS`] days, today included.
pub async fn get_upcoming_birthdays<S: Session>(
    limit: i64,
    offset: i64,
    session: &mut S,
    user: &User,
) -> Result<Vec<Contact>, RepositoryError> {
    let window = BirthdayWindow::from_today(DEFAULT_WINDOW_DAYS);
    get_upcoming_birthdays_within(window, limit, offset, session, user).await
}

/// The user's contacts celebrating a birthday inside `window`.
#[tracing::instrument(
    name = "get_upcoming_birthdays",
    skip(window, session, user),
    fields(user_id = %user.id, start = %window.start, days = window.days)
)]
pub async fn get_upcoming_birthdays_within<S: Session>(
    window: BirthdayWindow,
    limit: i64,
    offset: i64,
    session: &mut S,
    user: &User,
) -> Result<Vec<Contact>, RepositoryError> {
    let filter = ContactFilter::owned_by(user)
        .with_birthdays_in(window)
        .paginate(limit, offset);
    session.execute(Select::Contacts(filter)).await?.scalars()
}
