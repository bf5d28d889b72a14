//! Shared domain types for Contactbook.
//!
//! This crate contains the entities (User, Contact), their input schemas,
//! configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror and
//! email_address for schema validation.

pub mod config;
pub mod contact;
pub mod error;
pub mod user;

mod validate;
