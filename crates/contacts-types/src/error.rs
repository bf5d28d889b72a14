use thiserror::Error;

/// Errors from repository operations (returned by the session port and the
/// repository functions in contacts-core).
///
/// A missing record is never one of these: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("query returned more than one row")]
    MultipleRows,
}

/// Errors raised while validating input schemas.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SchemaError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SchemaError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            SchemaError::Invalid { field, .. } => field,
        }
    }
}
