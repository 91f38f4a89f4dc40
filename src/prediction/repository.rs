use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Choice, Prediction};
use crate::shared::AppError;

/// Trait for prediction repository operations
#[async_trait]
pub trait PredictionRepository {
    /// Returns the user's predictions ordered by fight id
    async fn find_for_user(&self, user: &str) -> Result<Vec<Prediction>, AppError>;

    async fn find_all(&self) -> Result<Vec<Prediction>, AppError>;

    /// Inserts or overwrites the prediction stored under `(user, fight)`
    async fn upsert(&self, prediction: &Prediction) -> Result<(), AppError>;
}

/// In-memory implementation of PredictionRepository for development and testing
///
/// Keyed by `(user, fight)` so iteration order matches the fight-id ordering
/// the Postgres implementation gets from `ORDER BY`.
#[derive(Debug, Default)]
pub struct InMemoryPredictionRepository {
    predictions: RwLock<BTreeMap<(String, i64), Choice>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self {
            predictions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the current number of stored predictions
    pub async fn prediction_count(&self) -> usize {
        self.predictions.read().await.len()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    #[instrument(skip(self))]
    async fn find_for_user(&self, user: &str) -> Result<Vec<Prediction>, AppError> {
        let predictions = self.predictions.read().await;
        let found: Vec<Prediction> = predictions
            .iter()
            .filter(|((owner, _), _)| owner == user)
            .map(|((owner, fight), choice)| Prediction::new(owner.clone(), *fight, choice.clone()))
            .collect();

        debug!(user = %user, count = found.len(), "Predictions loaded from memory");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Prediction>, AppError> {
        let predictions = self.predictions.read().await;
        Ok(predictions
            .iter()
            .map(|((owner, fight), choice)| Prediction::new(owner.clone(), *fight, choice.clone()))
            .collect())
    }

    #[instrument(skip(self, prediction))]
    async fn upsert(&self, prediction: &Prediction) -> Result<(), AppError> {
        debug!(
            user = %prediction.user,
            fight_id = prediction.fight,
            choice = %prediction.choice,
            "Upserting prediction in memory"
        );

        let mut predictions = self.predictions.write().await;
        predictions.insert(
            (prediction.user.clone(), prediction.fight),
            prediction.choice.clone(),
        );
        Ok(())
    }
}

/// PostgreSQL implementation of prediction repository
pub struct PostgresPredictionRepository {
    pool: PgPool,
}

impl PostgresPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn prediction_from_row(row: &sqlx::postgres::PgRow) -> Prediction {
    let choice: String = row.get("choice");
    Prediction {
        user: row.get("user_id"),
        fight: row.get("fight_id"),
        choice: Choice::from(choice),
    }
}

#[async_trait]
impl PredictionRepository for PostgresPredictionRepository {
    #[instrument(skip(self))]
    async fn find_for_user(&self, user: &str) -> Result<Vec<Prediction>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, fight_id, choice FROM predictions WHERE user_id = $1 ORDER BY fight_id",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user = %user, "Failed to load predictions from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(user = %user, count = rows.len(), "Predictions loaded from database");
        Ok(rows.iter().map(prediction_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Prediction>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, fight_id, choice FROM predictions ORDER BY user_id, fight_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to load predictions from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(prediction_from_row).collect())
    }

    #[instrument(skip(self, prediction))]
    async fn upsert(&self, prediction: &Prediction) -> Result<(), AppError> {
        debug!(
            user = %prediction.user,
            fight_id = prediction.fight,
            "Upserting prediction in database"
        );

        sqlx::query(
            "INSERT INTO predictions (user_id, fight_id, choice) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, fight_id) DO UPDATE SET choice = EXCLUDED.choice",
        )
        .bind(&prediction.user)
        .bind(prediction.fight)
        .bind(prediction.choice.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, fight_id = prediction.fight, "Failed to upsert prediction");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
