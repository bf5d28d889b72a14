//! Cryptographic operations for Contactbook.
//!
//! - `password`: Argon2id password hashing for stored credentials

pub mod password;
