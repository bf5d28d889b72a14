//! SQLite storage layer.
//!
//! The `Session` implementation backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod pool;
mod rows;
pub mod session;

pub use pool::{database_url, DatabasePool};
pub use session::SqliteSession;
