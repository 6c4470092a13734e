//! Create / read / full-replace update / delete, generic over [`Resource`].
//!
//! Each write runs in its own transaction and commits exactly once.  Write
//! transactions take the store's write lock up front, so overlapping writes
//! queue instead of failing.  There is no concurrency token: two updates of
//! the same row race and the later commit wins.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{info, instrument, warn};

use db::pool::begin_write;
use db::repository;
use db::DbPool;

use crate::{Resource, WorkshopError};

/// Every non-null reference in `draft` must resolve at the time it is set.
async fn check_references<R: Resource>(
    conn: &mut SqliteConnection,
    draft: &R::Draft,
) -> Result<(), WorkshopError> {
    for (kind, id) in R::references(draft) {
        if !repository::exists(&mut *conn, kind, id).await? {
            warn!("{} references missing {} {}", R::KIND, kind, id);
            return Err(WorkshopError::Validation(format!(
                "{kind} with id {id} does not exist"
            )));
        }
    }
    Ok(())
}

/// Persist a new entity and return it with identity and timestamps set.
///
/// # Errors
/// - [`WorkshopError::Validation`] if a required field is absent or a
///   reference does not resolve.
/// - [`WorkshopError::WriteFailure`] if the store inserted nothing.
#[instrument(skip(pool, input), fields(resource = %R::KIND))]
pub async fn create<R: Resource>(pool: &DbPool, input: R::Input) -> Result<R, WorkshopError> {
    let draft = R::draft(input)?;

    let mut tx = begin_write(pool).await?;
    check_references::<R>(&mut tx, &draft).await?;

    let row = R::insert(&mut tx, &draft, Utc::now())
        .await?
        .ok_or(WorkshopError::WriteFailure {
            resource: R::KIND,
            id: None,
            action: "creating",
        })?;
    tx.commit().await?;

    info!("{} {} created", R::KIND, row.id());
    Ok(row)
}

/// Fetch one entity by identity.
pub async fn get<R: Resource>(pool: &DbPool, id: i64) -> Result<R, WorkshopError> {
    repository::get::<R>(pool, id)
        .await?
        .ok_or(WorkshopError::NotFound { resource: R::KIND, id })
}

/// Every entity of the type, in identity order.  Empty is not an error.
pub async fn list<R: Resource>(pool: &DbPool) -> Result<Vec<R>, WorkshopError> {
    Ok(repository::list::<R>(pool).await?)
}

/// Overwrite every mutable field of entity `id` with `input`.
///
/// Fields absent from `input` are cleared, not kept.  `modified_at` is
/// refreshed; `created_at` is untouched.
///
/// # Errors
/// - [`WorkshopError::NotFound`] if `id` does not resolve (checked before
///   the input is validated).
/// - [`WorkshopError::Validation`] as for [`create`].
/// - [`WorkshopError::WriteFailure`] if no row changed.
#[instrument(skip(pool, input), fields(resource = %R::KIND))]
pub async fn update<R: Resource>(
    pool: &DbPool,
    id: i64,
    input: R::Input,
) -> Result<R, WorkshopError> {
    let mut tx = begin_write(pool).await?;

    if repository::get::<R>(&mut *tx, id).await?.is_none() {
        return Err(WorkshopError::NotFound { resource: R::KIND, id });
    }

    let draft = R::draft(input)?;
    check_references::<R>(&mut tx, &draft).await?;

    let write_failure = WorkshopError::WriteFailure {
        resource: R::KIND,
        id: Some(id),
        action: "updating",
    };
    if !R::update(&mut tx, id, &draft, Utc::now()).await? {
        return Err(write_failure);
    }
    let row = repository::get::<R>(&mut *tx, id).await?.ok_or(write_failure)?;
    tx.commit().await?;

    info!("{} {} updated", R::KIND, id);
    Ok(row)
}

/// Remove entity `id` and return the row as it was.
///
/// Rows referencing it keep their now-dangling foreign key.
///
/// # Errors
/// - [`WorkshopError::NotFound`] if `id` does not resolve.
/// - [`WorkshopError::WriteFailure`] if no row was deleted.
#[instrument(skip(pool), fields(resource = %R::KIND))]
pub async fn delete<R: Resource>(pool: &DbPool, id: i64) -> Result<R, WorkshopError> {
    let mut tx = begin_write(pool).await?;

    let row = repository::get::<R>(&mut *tx, id)
        .await?
        .ok_or(WorkshopError::NotFound { resource: R::KIND, id })?;

    if !repository::remove::<R>(&mut *tx, id).await? {
        return Err(WorkshopError::WriteFailure {
            resource: R::KIND,
            id: Some(id),
            action: "deleting",
        });
    }
    tx.commit().await?;

    info!("{} {} deleted", R::KIND, id);
    Ok(row)
}
