//! Session port and repository functions for Contactbook.
//!
//! This crate defines the `Session` trait (the storage port) that the
//! infrastructure layer implements, and the contact/user repository
//! functions written against it. It depends only on `contacts-types` --
//! never on `contacts-infra` or any database/IO crate.

pub mod avatar;
pub mod birthday;
pub mod repository;
pub mod session;
