//! AvatarResolver trait for deriving profile pictures.
//!
//! Defined in contacts-core so `create_user` can attach an avatar without
//! coupling to a specific provider. The Gravatar adapter lives in
//! contacts-infra.

/// Abstraction over avatar URL derivation.
pub trait AvatarResolver: Send + Sync {
    /// Avatar URL for `email`, or `None` when no avatar should be stored.
    fn avatar_url(&self, email: &str) -> Option<String>;
}

/// Resolver that never assigns an avatar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAvatar;

impl AvatarResolver for NoAvatar {
    fn avatar_url(&self, _email: &str) -> Option<String> {
        None
    }
}
