use axum::{extract::State, routing::post, Json, Router};

use workshop::seed::{self, SeedOutcome};

use super::Confirmation;
use crate::{AppError, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/dataseed", post(dataseed))
}

/// Populate an empty store with demo data.
pub async fn dataseed(State(state): State<AppState>) -> Result<Json<Confirmation>, AppError> {
    let mut rng = seed::rng_for(state.seed_rng);
    let message = match seed::seed(&state.pool, &mut rng, &state.seed).await? {
        SeedOutcome::Seeded(_) => "Data seeded successfully!",
        SeedOutcome::Skipped => "Data already present, nothing seeded.",
    };

    Ok(Json(Confirmation {
        message: message.to_string(),
        id: None,
    }))
}
