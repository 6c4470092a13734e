//! `api` crate — HTTP REST API layer.
//!
//! Exposes, for each of `/roles`, `/users`, `/customers`, `/vehicles`,
//! `/jobstatuses`, `/jobs` and `/jobdetails`:
//!   GET    /{base}
//!   GET    /{base}/{id}
//!   POST   /{base}
//!   PATCH  /{base}/{id}
//!   DELETE /{base}/{id}
//!
//! plus the read views:
//!   GET    /customers/{id}/vehicles
//!   GET    /vehicles/{id}/jobs
//!   GET    /vehicles/{id}/jobsAndDetails
//!   GET    /jobs/{id}/jobdetails
//!   POST   /testing/dataseed

pub mod error;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use db::DbPool;
use workshop::SeedConfig;

pub use error::AppError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub seed: SeedConfig,
    /// Fixed RNG seed for `/testing/dataseed`; `None` seeds from the OS.
    pub seed_rng: Option<u64>,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            seed: SeedConfig::default(),
            seed_rng: None,
        }
    }
}

/// Build the application router.
///
/// Requests running longer than `request_timeout` are answered with
/// `408 Request Timeout`.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(handlers::routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `bind` and serve until the process is stopped.
pub async fn serve(bind: &str, state: AppState, request_timeout: Duration) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state, request_timeout)).await
}
