use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::service::{LeaderboardEntry, LeaderboardService};
use crate::shared::{AppError, AppState};

/// HTTP handler for the prediction leaderboard
///
/// GET /leaderboard
#[instrument(name = "leaderboard", skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let service = LeaderboardService::new(
        state.fight_repository.clone(),
        state.prediction_repository.clone(),
    );
    let standings = service.standings().await?;

    info!(users = standings.len(), "Leaderboard served");
    Ok(Json(standings))
}
