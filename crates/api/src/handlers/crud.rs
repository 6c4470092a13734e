//! The five record routes, generic over the resource.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use db::Table;
use workshop::{service, Resource};

use super::Confirmation;
use crate::{AppError, AppState};

/// `GET /` + `POST /` + `GET|PATCH|DELETE /:id`, returning raw records.
pub fn router<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/:id", get(get_one::<R>).patch(update::<R>).delete(delete::<R>))
}

pub async fn list<R: Resource>(State(state): State<AppState>) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(service::list::<R>(&state.pool).await?))
}

pub async fn get_one<R: Resource>(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<R>, AppError> {
    Ok(Json(service::get::<R>(&state.pool, id).await?))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(input): Json<R::Input>,
) -> Result<Json<Confirmation>, AppError> {
    let row = service::create::<R>(&state.pool, input).await?;
    Ok(confirm::<R>(row.id(), "created"))
}

pub async fn update<R: Resource>(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(input): Json<R::Input>,
) -> Result<Json<Confirmation>, AppError> {
    let row = service::update::<R>(&state.pool, id, input).await?;
    Ok(confirm::<R>(row.id(), "updated"))
}

pub async fn delete<R: Resource>(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Confirmation>, AppError> {
    let row = service::delete::<R>(&state.pool, id).await?;
    Ok(confirm::<R>(row.id(), "deleted"))
}

fn confirm<R: Resource>(id: i64, action: &str) -> Json<Confirmation> {
    Json(Confirmation {
        message: format!("{} {id} {action} successfully", R::KIND),
        id: Some(id),
    })
}
