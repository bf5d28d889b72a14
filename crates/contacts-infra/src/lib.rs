//! Infrastructure layer for Contactbook.
//!
//! Contains implementations of the ports defined in `contacts-core`:
//! the SQLite session and the Gravatar avatar resolver. Also hosts Argon2id
//! password hashing and the `config.toml` loader.

pub mod avatar;
pub mod config;
pub mod crypto;
pub mod sqlite;
