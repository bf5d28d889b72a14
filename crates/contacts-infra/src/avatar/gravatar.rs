//! Gravatar avatar resolution.
//!
//! Implements the `AvatarResolver` trait from `contacts-core` using the
//! `sha2` crate. Gravatar accepts SHA-256 hashes of the trimmed, lowercased
//! address.

use sha2::{Digest, Sha256};

use contacts_core::avatar::AvatarResolver;
use contacts_types::config::AvatarConfig;

const GRAVATAR_BASE_URL: &str = "https://www.gravatar.com/avatar";

/// Gravatar implementation of `AvatarResolver`.
///
/// Only builds a URL; no network request is made, so a missing Gravatar
/// profile still yields the configured fallback image.
#[derive(Debug, Clone)]
pub struct GravatarResolver {
    enabled: bool,
    size: u32,
    default_image: String,
}

impl GravatarResolver {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            enabled: config.enabled,
            size: config.size,
            default_image: config.default_image.clone(),
        }
    }

    fn email_hash(email: &str) -> String {
        let normalized = email.trim().to_lowercase();
        let digest = Sha256::digest(normalized.as_bytes());
        format!("{:x}", digest)
    }
}

impl Default for GravatarResolver {
    fn default() -> Self {
        Self::new(&AvatarConfig::default())
    }
}

impl AvatarResolver for GravatarResolver {
    fn avatar_url(&self, email: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        if email.trim().is_empty() {
            tracing::warn!("cannot derive a gravatar for an empty email");
            return None;
        }

        Some(format!(
            "{GRAVATAR_BASE_URL}/{}?s={}&d={}",
            Self::email_hash(email),
            self.size,
            self.default_image
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HASH: &str = "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b";

    #[test]
    fn test_gravatar_url_known_value() {
        let resolver = GravatarResolver::default();
        let url = resolver.avatar_url("test@example.com").unwrap();
        assert_eq!(
            url,
            format!("https://www.gravatar.com/avatar/{TEST_HASH}?s=200&d=identicon")
        );
    }

    #[test]
    fn test_gravatar_normalizes_email() {
        let resolver = GravatarResolver::default();
        assert_eq!(
            resolver.avatar_url("  Test@Example.COM "),
            resolver.avatar_url("test@example.com")
        );
    }

    #[test]
    fn test_gravatar_uses_configured_size_and_fallback() {
        let resolver = GravatarResolver::new(&AvatarConfig {
            enabled: true,
            size: 80,
            default_image: "retro".to_string(),
        });
        let url = resolver.avatar_url("test@example.com").unwrap();
        assert!(url.ends_with("?s=80&d=retro"));
    }

    #[test]
    fn test_gravatar_disabled_returns_none() {
        let resolver = GravatarResolver::new(&AvatarConfig {
            enabled: false,
            ..AvatarConfig::default()
        });
        assert!(resolver.avatar_url("test@example.com").is_none());
    }

    #[test]
    fn test_gravatar_empty_email_returns_none() {
        let resolver = GravatarResolver::default();
        assert!(resolver.avatar_url("   ").is_none());
    }
}
