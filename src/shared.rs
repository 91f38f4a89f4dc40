use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::config::Config;
use crate::fight::repository::FightRepository;
use crate::prediction::repository::PredictionRepository;
use crate::websockets::{ConnectionManager, ReplyRegistry};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub fight_repository: Arc<dyn FightRepository + Send + Sync>,
    pub prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub replies: ReplyRegistry,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        fight_repository: Arc<dyn FightRepository + Send + Sync>,
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        connection_manager: Arc<dyn ConnectionManager>,
        config: Config,
    ) -> Self {
        Self {
            fight_repository,
            prediction_repository,
            connection_manager,
            replies: ReplyRegistry::new(),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::DatabaseError(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
