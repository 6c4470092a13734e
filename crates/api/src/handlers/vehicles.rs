use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use db::models::Vehicle;
use workshop::projection::{self, VehicleJobTreeView, VehicleJobsView, VehicleOverviewView, VehicleView};

use super::crud;
use crate::{AppError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(crud::create::<Vehicle>))
        .route(
            "/:id",
            get(get_one)
                .patch(crud::update::<Vehicle>)
                .delete(crud::delete::<Vehicle>),
        )
        .route("/:id/jobs", get(jobs))
        .route("/:id/jobsAndDetails", get(jobs_and_details))
        // Older clients use this casing.
        .route("/:id/jobsandDetails", get(jobs_and_details))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleOverviewView>>, AppError> {
    Ok(Json(projection::vehicles(&state.pool).await?))
}

pub async fn get_one(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<VehicleView>, AppError> {
    Ok(Json(projection::vehicle(&state.pool, id).await?))
}

pub async fn jobs(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<VehicleJobsView>, AppError> {
    Ok(Json(projection::vehicle_jobs(&state.pool, id).await?))
}

pub async fn jobs_and_details(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<VehicleJobTreeView>, AppError> {
    Ok(Json(projection::vehicle_jobs_and_details(&state.pool, id).await?))
}
