//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A relation path whose hops do not chain (`to` of one hop is not the
    /// `from` of the next, or the first hop does not start at the root kind).
    #[error("invalid relation path: {0}")]
    InvalidPath(String),
}
