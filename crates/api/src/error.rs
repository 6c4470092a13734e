use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use workshop::WorkshopError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Workshop(#[from] WorkshopError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Workshop(err) = self;
        let message = err.to_string();

        let status = match &err {
            WorkshopError::NotFound { .. } => {
                tracing::warn!("Not found: {}", message);
                StatusCode::NOT_FOUND
            }
            WorkshopError::Validation(_) => {
                tracing::warn!("Validation error: {}", message);
                StatusCode::BAD_REQUEST
            }
            WorkshopError::WriteFailure { .. } => {
                tracing::warn!("Write failed: {}", message);
                StatusCode::BAD_REQUEST
            }
            WorkshopError::SeedFailure(_) => {
                tracing::warn!("Seed failed: {}", message);
                StatusCode::BAD_REQUEST
            }
            WorkshopError::Database(e) => {
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::{DbError, Kind};

    fn status_of(err: WorkshopError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_status_codes() {
        assert_eq!(
            status_of(WorkshopError::NotFound { resource: Kind::Job, id: 1 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(WorkshopError::Validation("Title is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorkshopError::WriteFailure {
                resource: Kind::Job,
                id: Some(1),
                action: "deleting"
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorkshopError::SeedFailure("disk full".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(WorkshopError::Database(DbError::InvalidPath("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
