//! Repository functions.
//!
//! Stateless async functions over an injected [`Session`](crate::session::Session).
//! Each mutation stages its writes and commits once; a missing record is
//! `Ok(None)`, and storage errors propagate unchanged.

pub mod contacts;
pub mod users;
