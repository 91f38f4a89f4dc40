use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::fight::{Fight, FightFilter, FightRepository};
use crate::prediction::PredictionRepository;
use crate::shared::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user: String,
    pub score: i64,
}

/// Scores every user's predictions against recorded winners
pub struct LeaderboardService {
    fight_repository: Arc<dyn FightRepository + Send + Sync>,
    prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
}

impl LeaderboardService {
    pub fn new(
        fight_repository: Arc<dyn FightRepository + Send + Sync>,
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    ) -> Self {
        Self {
            fight_repository,
            prediction_repository,
        }
    }

    /// Users with at least one correct prediction, highest score first
    ///
    /// Ties keep the order in which users first scored.
    #[instrument(skip(self))]
    pub async fn standings(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let resolved: HashMap<i64, Fight> = self
            .fight_repository
            .find_fights(FightFilter::Resolved)
            .await?
            .into_iter()
            .map(|fight| (fight.id, fight))
            .collect();

        let mut entries: Vec<LeaderboardEntry> = Vec::new();
        for prediction in self.prediction_repository.find_all().await? {
            if prediction.choice.is_abstain() {
                continue;
            }
            let Some(fight) = resolved.get(&prediction.fight) else {
                continue;
            };
            let Some(winner) = fight.winner.as_deref() else {
                continue;
            };
            if !prediction.choice.picks(winner) {
                continue;
            }

            let points = i64::from(fight.points_value());
            match entries.iter_mut().find(|entry| entry.user == prediction.user) {
                Some(entry) => entry.score += points,
                None => entries.push(LeaderboardEntry {
                    user: prediction.user,
                    score: points,
                }),
            }
        }

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        debug!(users = entries.len(), "Leaderboard computed");
        Ok(entries)
    }
}
