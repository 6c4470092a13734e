use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use db::models::Job;
use workshop::projection::{self, JobDetailsView};

use super::crud;
use crate::{AppError, AppState};

/// Jobs are served as raw records, plus the details view.
pub fn router() -> Router<AppState> {
    crud::router::<Job>().route("/:id/jobdetails", get(details))
}

pub async fn details(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<JobDetailsView>, AppError> {
    Ok(Json(projection::job_details(&state.pool, id).await?))
}
