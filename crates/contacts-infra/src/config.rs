//! Data directory and `config.toml` handling.
//!
//! Configuration problems never stop the CLI: every failure to read or parse
//! the file degrades to [`ContactsConfig::default()`].

use std::path::{Path, PathBuf};

use contacts_types::config::ContactsConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CONTACTS_DATA_DIR";

/// Resolve the data directory holding `contacts.db` and `config.toml`.
///
/// Priority: `CONTACTS_DATA_DIR`, then `~/.contactbook`, then `./.contactbook`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".contactbook");
    }

    PathBuf::from(".contactbook")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// A missing file yields [`ContactsConfig::default()`]; an unreadable or
/// unparsable file is logged and also yields the default.
pub async fn load_config(data_dir: &Path) -> ContactsConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                tracing::debug!(path = %config_path.display(), "config file absent, using defaults");
            } else {
                tracing::warn!(path = %config_path.display(), error = %err, "config file unreadable, using defaults");
            }
            return ContactsConfig::default();
        }
    };

    toml::from_str(&content).unwrap_or_else(|err| {
        tracing::warn!(path = %config_path.display(), error = %err, "config file malformed, using defaults");
        ContactsConfig::default()
    })
}

/// Resolve the page size for a listing.
///
/// Uses `requested` when given, else the configured default, and clamps the
/// result into `1..=max_page_limit`.
pub fn resolve_page_limit(config: &ContactsConfig, requested: Option<i64>) -> i64 {
    let max = config.max_page_limit.max(1);
    requested.unwrap_or(config.default_page_limit).clamp(1, max)
}
