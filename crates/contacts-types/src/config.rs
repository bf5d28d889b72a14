//! Configuration types for Contactbook.
//!
//! `ContactsConfig` represents the top-level `config.toml` that controls
//! pagination limits, the upcoming-birthdays window and avatar derivation.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.contactbook/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// Length of the forward window (in days) for upcoming-birthday lookups.
    #[serde(default = "default_upcoming_birthdays_days")]
    pub upcoming_birthdays_days: u32,

    /// Page size used when the caller does not ask for one.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: i64,

    /// Largest page size a caller may request.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: i64,

    #[serde(default)]
    pub avatar: AvatarConfig,
}

fn default_upcoming_birthdays_days() -> u32 {
    7
}

fn default_page_limit() -> i64 {
    10
}

fn default_max_page_limit() -> i64 {
    500
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            upcoming_birthdays_days: default_upcoming_birthdays_days(),
            default_page_limit: default_page_limit(),
            max_page_limit: default_max_page_limit(),
            avatar: AvatarConfig::default(),
        }
    }
}

/// Gravatar settings used when a new account is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarConfig {
    #[serde(default = "default_avatar_enabled")]
    pub enabled: bool,
    /// Requested image size in pixels.
    #[serde(default = "default_avatar_size")]
    pub size: u32,
    /// Fallback image style for addresses without a Gravatar ("identicon", "retro", ...).
    #[serde(default = "default_avatar_image")]
    pub default_image: String,
}

fn default_avatar_enabled() -> bool {
    true
}

fn default_avatar_size() -> u32 {
    200
}

fn default_avatar_image() -> String {
    "identicon".to_string()
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: default_avatar_enabled(),
            size: default_avatar_size(),
            default_image: default_avatar_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ContactsConfig::default();
        assert_eq!(config.upcoming_birthdays_days, 7);
        assert_eq!(config.default_page_limit, 10);
        assert_eq!(config.max_page_limit, 500);
        assert!(config.avatar.enabled);
        assert_eq!(config.avatar.size, 200);
        assert_eq!(config.avatar.default_image, "identicon");
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: ContactsConfig = toml::from_str("").unwrap();
        assert_eq!(config, ContactsConfig::default());
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
upcoming_birthdays_days = 14
default_page_limit = 25

[avatar]
enabled = false
default_image = "retro"
"#;
        let config: ContactsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.upcoming_birthdays_days, 14);
        assert_eq!(config.default_page_limit, 25);
        assert_eq!(config.max_page_limit, 500);
        assert!(!config.avatar.enabled);
        assert_eq!(config.avatar.size, 200);
        assert_eq!(config.avatar.default_image, "retro");
    }
}
