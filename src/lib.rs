// Library crate for the bracketboi prediction league
// This file exposes the public API for the binary and integration tests

pub mod bracket;
pub mod collector;
pub mod commands;
pub mod config;
pub mod fight;
pub mod interaction;
pub mod leaderboard;
pub mod prediction;
pub mod shared;
pub mod uptime;
pub mod websockets;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

// Re-export commonly used types for easier access in tests
pub use bracket::{expand_bracket, synthesize_next_round, BracketError, RoundLabel};
pub use collector::{Choices, CollectError, Collector, CommitStrategy};
pub use config::Config;
pub use fight::{Fight, FightFilter, FightRepository};
pub use interaction::{InteractionChannel, InteractionContext, Response};
pub use prediction::{Choice, Prediction, PredictionRepository};
pub use shared::{AppError, AppState};

/// Builds the HTTP and websocket routes over `app_state`
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "bracketboi is running" }))
        .route("/uptime", get(uptime::uptime))
        .route("/fights/upcoming", get(fight::upcoming_fights))
        .route("/leaderboard", get(leaderboard::leaderboard))
        .route("/ws/:user_id", get(websockets::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
