use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::CommitError;
use crate::fight::{Fight, FightRepository};
use crate::prediction::{Prediction, PredictionRepository};

/// Persists one resolved leaf choice
///
/// The collector stays agnostic of where choices go; the predict and results
/// flows inject different strategies.
#[async_trait]
pub trait CommitStrategy: Send + Sync {
    async fn commit(&self, fight: &Fight, prediction: &Prediction) -> Result<(), CommitError>;
}

/// Stores a user's prediction, refusing fights whose deadline has passed
pub struct PredictionCommit {
    repository: Arc<dyn PredictionRepository + Send + Sync>,
}

impl PredictionCommit {
    pub fn new(repository: Arc<dyn PredictionRepository + Send + Sync>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommitStrategy for PredictionCommit {
    #[instrument(skip_all, fields(fight_id = fight.id, user = %prediction.user))]
    async fn commit(&self, fight: &Fight, prediction: &Prediction) -> Result<(), CommitError> {
        if !fight.is_open_at(Utc::now()) {
            warn!(deadline = %fight.deadline, "Prediction submitted after deadline");
            return Err(CommitError::PastDeadline {
                fight_id: fight.id,
                deadline: fight.deadline,
            });
        }

        self.repository.upsert(prediction).await?;
        Ok(())
    }
}

/// Records the choice as the fight's winner; no deadline applies to results
pub struct ResultCommit {
    repository: Arc<dyn FightRepository + Send + Sync>,
}

impl ResultCommit {
    pub fn new(repository: Arc<dyn FightRepository + Send + Sync>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommitStrategy for ResultCommit {
    #[instrument(skip_all, fields(fight_id = fight.id))]
    async fn commit(&self, fight: &Fight, prediction: &Prediction) -> Result<(), CommitError> {
        self.repository
            .upsert_winner(fight, prediction.choice.as_str())
            .await?;

        info!(winner = %prediction.choice, "Result recorded");
        Ok(())
    }
}
