//! User repository.

use contacts_types::error::RepositoryError;
use contacts_types::user::{User, UserSchema};

use crate::avatar::AvatarResolver;
use crate::session::{refresh, Select, Session, UserChange, UserFilter, UserPatch};

/// The account registered under `email` (case-insensitive), if any.
#[tracing::instrument(name = "get_user_by_email", skip(session))]
pub async fn get_user_by_email<S: Session>(
    email: &str,
    session: &mut S,
) -> Result<Option<User>, RepositoryError> {
    session
        .execute(Select::Users(UserFilter::by_email(email)))
        .await?
        .scalar_one_or_none()
}

/// Register a new, unconfirmed account.
///
/// The avatar comes from `avatars`; a resolver returning `None` leaves it
/// unset. A duplicate email surfaces as [`RepositoryError::Conflict`] from
/// the commit.
#[tracing::instrument(name = "create_user", skip(body, avatars, session), fields(email = %body.email))]
pub async fn create_user<S: Session>(
    body: &UserSchema,
    avatars: &dyn AvatarResolver,
    session: &mut S,
) -> Result<User, RepositoryError> {
    let avatar = avatars.avatar_url(&body.email);
    if avatar.is_none() {
        tracing::debug!("no avatar assigned");
    }

    let user = User::from_schema(body, avatar);
    session.add(user.clone().into());
    session.commit().await?;
    tracing::debug!(user_id = %user.id, "user created");
    refresh(session, user).await
}

/// Store a new refresh token for `user` (`None` clears it).
#[tracing::instrument(name = "update_token", skip_all, fields(user_id = %user.id))]
pub async fn update_token<S: Session>(
    user: &mut User,
    token: Option<String>,
    session: &mut S,
) -> Result<(), RepositoryError> {
    write_change(user, UserChange::RefreshToken(token), session).await
}

/// Mark the account registered under `email` as confirmed.
///
/// Returns `Ok(None)` without committing when no such account exists.
#[tracing::instrument(name = "confirmed_email", skip(session))]
pub async fn confirmed_email<S: Session>(
    email: &str,
    session: &mut S,
) -> Result<Option<User>, RepositoryError> {
    let Some(mut user) = get_user_by_email(email, session).await? else {
        return Ok(None);
    };

    write_change(&mut user, UserChange::Confirmed(true), session).await?;
    tracing::debug!(user_id = %user.id, "email confirmed");
    Ok(Some(user))
}

/// Replace the stored (already hashed) password of `user`.
#[tracing::instrument(name = "change_password", skip_all, fields(user_id = %user.id))]
pub async fn change_password<S: Session>(
    user: &mut User,
    new_password: &str,
    session: &mut S,
) -> Result<(), RepositoryError> {
    write_change(user, UserChange::Password(new_password.to_string()), session).await
}

/// Replace the avatar URL of the account registered under `email`.
///
/// Returns `Ok(None)` without committing when no such account exists.
#[tracing::instrument(name = "update_avatar_url", skip(session))]
pub async fn update_avatar_url<S: Session>(
    email: &str,
    url: Option<&str>,
    session: &mut S,
) -> Result<Option<User>, RepositoryError> {
    let Some(mut user) = get_user_by_email(email, session).await? else {
        return Ok(None);
    };

    write_change(&mut user, UserChange::Avatar(url.map(str::to_string)), session).await?;
    Ok(Some(user))
}

/// Stage one column update, mirror it onto `user` and commit.
async fn write_change<S: Session>(
    user: &mut User,
    change: UserChange,
    session: &mut S,
) -> Result<(), RepositoryError> {
    let patch = UserPatch::new(user.id, change);
    patch.apply_to(user);
    session.update(patch);
    session.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::NoAvatar;
    use crate::session::testing::RecordingSession;
    use crate::session::{QueryResult, Record};
    use contacts_types::user::UserId;

    fn only_change(session: &RecordingSession, id: UserId) -> &UserChange {
        assert!(session.added.is_empty());
        assert_eq!(session.updated.len(), 1);
        assert_eq!(session.updated[0].id, id);
        &session.updated[0].change
    }

    struct FixedAvatar;

    impl AvatarResolver for FixedAvatar {
        fn avatar_url(&self, email: &str) -> Option<String> {
            Some(format!("https://avatars.test/{email}"))
        }
    }

    fn user(email: &str, password: &str) -> User {
        User::from_schema(
            &UserSchema {
                username: "test_user".to_string(),
                password: password.to_string(),
                email: email.to_string(),
            },
            None,
        )
    }

    fn only_user_filter(session: &RecordingSession) -> &UserFilter {
        assert_eq!(session.executed.len(), 1);
        match &session.executed[0] {
            Select::Users(filter) => filter,
            other => panic!("expected a user select, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_user_by_email() {
        let stored = user("test@example.com", "test_psw");
        let mut session =
            RecordingSession::new().with_result(QueryResult::from_entities(vec![stored.clone()]));

        let result = get_user_by_email("test@example.com", &mut session).await.unwrap();

        assert_eq!(result, Some(stored));
        assert_eq!(
            only_user_filter(&session).email.as_deref(),
            Some("test@example.com")
        );
    }

    #[tokio::test]
    async fn test_get_user_by_email_missing() {
        let mut session = RecordingSession::new();
        let result = get_user_by_email("nobody@example.com", &mut session).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_user() {
        let body = UserSchema {
            username: "test_user".to_string(),
            password: "test_psw".to_string(),
            email: "test@example.com".to_string(),
        };
        let mut session = RecordingSession::new();

        let result = create_user(&body, &NoAvatar, &mut session).await.unwrap();

        assert_eq!(result.email, body.email);
        assert_eq!(result.username, body.username);
        assert!(!result.confirmed);
        assert!(result.avatar.is_none());
        assert_eq!(session.added, vec![Record::User(result.clone())]);
        assert_eq!(session.commits, 1);
        assert_eq!(session.refreshed.len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_assigns_avatar() {
        let body = UserSchema {
            username: "test_user".to_string(),
            password: "test_psw".to_string(),
            email: "test@example.com".to_string(),
        };
        let mut session = RecordingSession::new();

        let result = create_user(&body, &FixedAvatar, &mut session).await.unwrap();

        assert_eq!(
            result.avatar.as_deref(),
            Some("https://avatars.test/test@example.com")
        );
    }

    #[tokio::test]
    async fn test_create_user_stores_fields_verbatim() {
        let body = UserSchema {
            username: " test_user ".to_string(),
            password: "test_psw".to_string(),
            email: "test@example.com ".to_string(),
        };
        let mut session = RecordingSession::new();

        let result = create_user(&body, &NoAvatar, &mut session).await.unwrap();

        assert_eq!(result.username, body.username);
        assert_eq!(result.email, body.email);
    }

    #[tokio::test]
    async fn test_update_token() {
        let mut target = user("test@example.com", "test_psw");
        let mut session = RecordingSession::new();

        update_token(&mut target, Some("new_token".to_string()), &mut session)
            .await
            .unwrap();

        assert_eq!(target.refresh_token.as_deref(), Some("new_token"));
        assert_eq!(target.password, "test_psw");
        assert_eq!(session.commits, 1);
        assert_eq!(
            only_change(&session, target.id),
            &UserChange::RefreshToken(Some("new_token".to_string()))
        );
        assert_eq!(session.updated[0].updated_at, target.updated_at);
    }

    #[tokio::test]
    async fn test_update_token_clears() {
        let mut target = user("test@example.com", "test_psw");
        target.refresh_token = Some("old".to_string());
        let mut session = RecordingSession::new();

        update_token(&mut target, None, &mut session).await.unwrap();

        assert!(target.refresh_token.is_none());
        assert_eq!(session.commits, 1);
        assert_eq!(only_change(&session, target.id), &UserChange::RefreshToken(None));
    }

    #[tokio::test]
    async fn test_confirmed_email() {
        let stored = user("test@example.com", "test_psw");
        let mut session =
            RecordingSession::new().with_result(QueryResult::from_entities(vec![stored.clone()]));

        let result = confirmed_email("test@example.com", &mut session)
            .await
            .unwrap()
            .unwrap();

        assert!(result.confirmed);
        assert_eq!(result.id, stored.id);
        assert_eq!(result.password, stored.password);
        assert_eq!(session.commits, 1);
        assert_eq!(only_change(&session, stored.id), &UserChange::Confirmed(true));
    }

    #[tokio::test]
    async fn test_confirmed_email_unknown_address() {
        let mut session = RecordingSession::new();

        let result = confirmed_email("nobody@example.com", &mut session).await.unwrap();

        assert!(result.is_none());
        assert_eq!(session.commits, 0);
        assert!(session.updated.is_empty());
    }

    #[tokio::test]
    async fn test_change_password() {
        let mut target = user("test@example.com", "test_password");
        let mut session = RecordingSession::new();

        change_password(&mut target, "new_password", &mut session)
            .await
            .unwrap();

        assert_eq!(target.password, "new_password");
        assert!(target.refresh_token.is_none());
        assert_eq!(session.commits, 1);
        assert_eq!(
            only_change(&session, target.id),
            &UserChange::Password("new_password".to_string())
        );
    }

    #[tokio::test]
    async fn test_change_password_propagates_commit_failure() {
        let mut target = user("test@example.com", "test_password");
        let mut session = RecordingSession::new().failing_commit();

        let result = change_password(&mut target, "new_password", &mut session).await;

        assert!(matches!(result, Err(RepositoryError::Connection)));
        assert_eq!(session.commits, 1);
    }

    #[tokio::test]
    async fn test_update_avatar_url() {
        let stored = user("test@example.com", "test_psw");
        let id = stored.id;
        let mut session =
            RecordingSession::new().with_result(QueryResult::from_entities(vec![stored]));

        let result = update_avatar_url("test@example.com", Some("https://img/new.png"), &mut session)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.avatar.as_deref(), Some("https://img/new.png"));
        assert_eq!(session.commits, 1);
        assert_eq!(
            only_change(&session, id),
            &UserChange::Avatar(Some("https://img/new.png".to_string()))
        );
    }
}
