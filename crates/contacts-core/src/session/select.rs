//! Typed read queries understood by every [`Session`](super::Session).

use contacts_types::contact::ContactId;
use contacts_types::user::{User, UserId};

use crate::birthday::BirthdayWindow;

/// A read query against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Select {
    Contacts(ContactFilter),
    Users(UserFilter),
}

/// Filter criteria for contact queries.
///
/// Only constructible through [`ContactFilter::owned_by`], so every contact
/// query carries its owner predicate. All other criteria are AND-combined;
/// text criteria are case-insensitive exact matches. Results are returned in
/// storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFilter {
    owner: UserId,
    id: Option<ContactId>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    birthdays: Option<BirthdayWindow>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ContactFilter {
    /// All contacts owned by `user`.
    pub fn owned_by(user: &User) -> Self {
        Self {
            owner: user.id,
            id: None,
            first_name: None,
            last_name: None,
            email: None,
            birthdays: None,
            limit: None,
            offset: None,
        }
    }

    pub fn with_id(mut self, id: ContactId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Keep only contacts whose birthday month/day falls inside `window`.
    pub fn with_birthdays_in(mut self, window: BirthdayWindow) -> Self {
        self.birthdays = Some(window);
        self
    }

    /// Limit/offset pagination. Negative values are treated as zero.
    pub fn paginate(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit.max(0));
        self.offset = Some(offset.max(0));
        self
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn id(&self) -> Option<ContactId> {
        self.id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn birthdays(&self) -> Option<&BirthdayWindow> {
        self.birthdays.as_ref()
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }
}

/// Filter criteria for user queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<UserId>,
    /// Case-insensitive exact match.
    pub email: Option<String>,
}

impl UserFilter {
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts_types::user::UserSchema;

    fn user() -> User {
        User::from_schema(
            &UserSchema {
                username: "test_user".to_string(),
                password: "password".to_string(),
                email: "test_user@gmail.com".to_string(),
            },
            None,
        )
    }

    #[test]
    fn test_owned_by_has_no_other_criteria() {
        let user = user();
        let filter = ContactFilter::owned_by(&user);
        assert_eq!(filter.owner(), user.id);
        assert!(filter.id().is_none());
        assert!(filter.first_name().is_none());
        assert!(filter.birthdays().is_none());
        assert!(filter.limit().is_none());
        assert!(filter.offset().is_none());
    }

    #[test]
    fn test_builder_sets_criteria() {
        let user = user();
        let id = ContactId::new();
        let filter = ContactFilter::owned_by(&user)
            .with_id(id)
            .with_first_name("Ann")
            .with_last_name("Lee")
            .with_email("ann@example.com");
        assert_eq!(filter.id(), Some(id));
        assert_eq!(filter.first_name(), Some("Ann"));
        assert_eq!(filter.last_name(), Some("Lee"));
        assert_eq!(filter.email(), Some("ann@example.com"));
    }

    #[test]
    fn test_paginate_clamps_negative_values() {
        let filter = ContactFilter::owned_by(&user()).paginate(-5, -1);
        assert_eq!(filter.limit(), Some(0));
        assert_eq!(filter.offset(), Some(0));
    }

    #[test]
    fn test_user_filter_by_email() {
        let filter = UserFilter::by_email("a@b.com");
        assert_eq!(filter.email.as_deref(), Some("a@b.com"));
        assert!(filter.id.is_none());
    }
}
