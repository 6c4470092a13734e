//! Domain-level error types.

use db::{DbError, Kind};
use thiserror::Error;

/// Errors produced by the workshop operations.
#[derive(Debug, Error)]
pub enum WorkshopError {
    /// The identity does not resolve.
    #[error("{resource} with id {id} not found.")]
    NotFound { resource: Kind, id: i64 },

    /// A required field is missing/blank or a reference does not resolve.
    #[error("{0}")]
    Validation(String),

    /// The store reported zero affected rows for a write.
    #[error("Error occurred while {action} {resource}{}.", id_suffix(.id))]
    WriteFailure {
        resource: Kind,
        id: Option<i64>,
        action: &'static str,
    },

    /// Seeding aborted; carries the underlying message verbatim.
    #[error("Error seeding data: {0}")]
    SeedFailure(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for WorkshopError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(err))
    }
}

fn id_suffix(id: &Option<i64>) -> String {
    id.map(|id| format!(" {id}")).unwrap_or_default()
}
