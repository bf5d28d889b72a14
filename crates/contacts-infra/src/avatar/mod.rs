//! Avatar providers.
//!
//! - `gravatar`: Gravatar URLs derived from a SHA-256 of the email address

pub mod gravatar;
