//! HTTP handlers, one module per route group.

pub mod crud;
pub mod customers;
pub mod jobs;
pub mod testing;
pub mod vehicles;

use axum::Router;
use serde::Serialize;

use db::models::{JobDetail, JobStatus, Role, User};

use crate::AppState;

/// Body returned by writes and the seed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Confirmation {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/roles", crud::router::<Role>())
        .nest("/users", crud::router::<User>())
        .nest("/customers", customers::router())
        .nest("/vehicles", vehicles::router())
        .nest("/jobstatuses", crud::router::<JobStatus>())
        .nest("/jobs", jobs::router())
        .nest("/jobdetails", crud::router::<JobDetail>())
        .nest("/testing", testing::router())
}
