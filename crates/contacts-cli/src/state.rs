//! Application state wiring the database, configuration and avatar provider.
//!
//! Every CLI command opens its own `SqliteSession` from the shared pool.

use anyhow::bail;
use contacts_core::repository::users;
use contacts_infra::avatar::gravatar::GravatarResolver;
use contacts_infra::config::{load_config, resolve_data_dir};
use contacts_infra::sqlite::{database_url, DatabasePool, SqliteSession};
use contacts_types::config::ContactsConfig;
use contacts_types::user::User;

/// Shared application state used by every CLI command.
#[derive(Clone)]
pub struct AppState {
    pub config: ContactsConfig,
    pub avatars: GravatarResolver,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the DB.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let avatars = GravatarResolver::new(&config.avatar);

        tracing::debug!(data_dir = %data_dir.display(), "application state ready");

        Ok(Self {
            config,
            avatars,
            db_pool,
        })
    }

    /// Open a fresh unit of work.
    pub fn session(&self) -> SqliteSession {
        SqliteSession::new(self.db_pool.clone())
    }

    /// Look up the account a contact command acts on behalf of.
    pub async fn acting_user(&self, session: &mut SqliteSession, email: &str) -> anyhow::Result<User> {
        match users::get_user_by_email(email, session).await? {
            Some(user) => Ok(user),
            None => bail!("no account registered under '{email}'"),
        }
    }
}
