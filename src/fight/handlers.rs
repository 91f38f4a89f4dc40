use axum::{extract::State, Json};
use chrono::Utc;
use tracing::{info, instrument};

use super::{models::Fight, repository::FightFilter};
use crate::shared::{AppError, AppState};

/// HTTP handler for listing fights still open for prediction
///
/// GET /fights/upcoming
#[instrument(name = "upcoming_fights", skip(state))]
pub async fn upcoming_fights(State(state): State<AppState>) -> Result<Json<Vec<Fight>>, AppError> {
    let fights = state
        .fight_repository
        .find_fights(FightFilter::OpenAt(Utc::now()))
        .await?;

    info!(fight_count = fights.len(), "Upcoming fights listed");
    Ok(Json(fights))
}
