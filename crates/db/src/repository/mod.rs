//! Repository functions — one function per database operation.
//!
//! Reads are generic over [`Table`] and accept any SQLite executor (the pool,
//! a pooled connection or an open transaction).  Writes go through
//! [`Writable`], implemented once per table in the sibling modules, and take
//! a `&mut SqliteConnection` so callers decide the transaction boundary.
//! No business logic, no validation — pure SQL.

pub mod customers;
pub mod job_details;
pub mod job_statuses;
pub mod jobs;
pub mod roles;
pub mod users;
pub mod vehicles;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};

use crate::{DbError, Kind};

/// A table whose rows decode into `Self`.
pub trait Table: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    const KIND: Kind;
    /// Select list, in declaration order of the record's fields.
    const COLUMNS: &'static str;

    /// The store-assigned identity of this row.
    fn id(&self) -> i64;
}

/// Insert and full-replace update for one table.
#[async_trait]
pub trait Writable: Table {
    type Draft: Send + Sync;

    /// Insert a row with `created_at = modified_at = now`.
    ///
    /// Returns `None` if the store reported no inserted row.
    async fn insert(
        conn: &mut SqliteConnection,
        draft: &Self::Draft,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, DbError>;

    /// Overwrite every mutable column of row `id` and set `modified_at = now`.
    ///
    /// Returns `true` iff a row changed.
    async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        draft: &Self::Draft,
        now: DateTime<Utc>,
    ) -> Result<bool, DbError>;

    /// Non-null foreign keys carried by `draft`.
    fn references(draft: &Self::Draft) -> Vec<(Kind, i64)>;
}

/// Fetch a single row by its primary key.
pub async fn get<'e, T: Table>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<T>, DbError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        T::COLUMNS,
        T::KIND.table(),
        T::KIND.key(),
    );
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Return all rows ordered by primary key.
pub async fn list<'e, T: Table>(executor: impl SqliteExecutor<'e>) -> Result<Vec<T>, DbError> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        T::COLUMNS,
        T::KIND.table(),
        T::KIND.key(),
    );
    let rows = sqlx::query_as::<_, T>(&sql).fetch_all(executor).await?;
    Ok(rows)
}

/// Ids bound per `IN (...)` query; SQLite caps the number of host parameters
/// in one statement.
const IN_CHUNK: usize = 500;

/// Return every row whose `column` holds one of `ids`, ordered by primary key.
///
/// Large id sets are queried in chunks of [`IN_CHUNK`] and merged.  `column`
/// must be a trusted column name; it is interpolated into the SQL.
pub async fn list_where_in<T: Table>(
    conn: &mut SqliteConnection,
    column: &str,
    ids: &[i64],
) -> Result<Vec<T>, DbError> {
    let mut rows = Vec::new();
    for chunk in ids.chunks(IN_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM {} WHERE {} IN ({}) ORDER BY {}",
            T::COLUMNS,
            T::KIND.table(),
            column,
            placeholders,
            T::KIND.key(),
        );

        let mut query = sqlx::query_as::<_, T>(&sql);
        for id in chunk {
            query = query.bind(*id);
        }
        rows.extend(query.fetch_all(&mut *conn).await?);
    }

    if ids.len() > IN_CHUNK {
        rows.sort_by_key(Table::id);
    }
    Ok(rows)
}

/// Permanently delete a row by its primary key.
///
/// Returns `true` iff a row was deleted.  Rows referencing it are left alone.
pub async fn remove<'e, T: Table>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<bool, DbError> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        T::KIND.table(),
        T::KIND.key(),
    );
    let result = sqlx::query(&sql).bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

/// Whether a row of `kind` with identity `id` exists.
pub async fn exists<'e>(
    executor: impl SqliteExecutor<'e>,
    kind: Kind,
    id: i64,
) -> Result<bool, DbError> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)",
        kind.table(),
        kind.key(),
    );
    let found: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(executor).await?;
    Ok(found)
}

/// Number of rows in the table.
pub async fn count<'e, T: Table>(executor: impl SqliteExecutor<'e>) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) FROM {}", T::KIND.table());
    let total: i64 = sqlx::query_scalar(&sql).fetch_one(executor).await?;
    Ok(total)
}

/// Insert every draft in order, returning the persisted rows.
pub async fn insert_all<T: Writable>(
    conn: &mut SqliteConnection,
    drafts: &[T::Draft],
    now: DateTime<Utc>,
) -> Result<Vec<T>, DbError> {
    let mut rows = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let row = T::insert(&mut *conn, draft, now)
            .await?
            .ok_or(DbError::Sqlx(sqlx::Error::RowNotFound))?;
        rows.push(row);
    }
    Ok(rows)
}
