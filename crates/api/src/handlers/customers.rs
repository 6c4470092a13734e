use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use db::models::Customer;
use workshop::projection::{self, CustomerVehiclesView, CustomerView};

use super::crud;
use crate::{AppError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(crud::create::<Customer>))
        .route(
            "/:id",
            get(get_one)
                .patch(crud::update::<Customer>)
                .delete(crud::delete::<Customer>),
        )
        .route("/:id/vehicles", get(vehicles))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CustomerView>>, AppError> {
    Ok(Json(projection::customers(&state.pool).await?))
}

pub async fn get_one(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CustomerView>, AppError> {
    Ok(Json(projection::customer(&state.pool, id).await?))
}

pub async fn vehicles(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CustomerVehiclesView>, AppError> {
    Ok(Json(projection::customer_vehicles(&state.pool, id).await?))
}
