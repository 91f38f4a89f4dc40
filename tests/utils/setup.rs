use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;

use bracketboi::{
    collector::Choices,
    commands::{Outcome, PredictCommand, ResultsCommand},
    config::Config,
    fight::{Fight, FightRepository, InMemoryFightRepository},
    interaction::InteractionContext,
    prediction::{InMemoryPredictionRepository, Prediction, PredictionRepository},
    CollectError,
};

use super::mocks::ScriptedChannel;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Fight with a deadline an hour from now
pub fn fight(id: i64, name: &str, bots: &[&str]) -> Fight {
    Fight::new(
        id,
        name,
        bots.iter().map(|bot| bot.to_string()).collect(),
        Utc::now() + ChronoDuration::hours(1),
    )
}

pub struct TestSetup {
    pub fights: Arc<InMemoryFightRepository>,
    pub predictions: Arc<InMemoryPredictionRepository>,
    pub channel: Arc<ScriptedChannel>,
    pub config: Arc<Config>,
}

pub struct TestSetupBuilder {
    fights: Vec<Fight>,
    predictions: Vec<Prediction>,
    admin_id: Option<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            fights: vec![],
            predictions: vec![],
            admin_id: None,
        }
    }

    pub fn with_fights(mut self, fights: Vec<Fight>) -> Self {
        self.fights = fights;
        self
    }

    pub fn with_prediction(mut self, prediction: Prediction) -> Self {
        self.predictions.push(prediction);
        self
    }

    pub fn with_admin(mut self, admin_id: &str) -> Self {
        self.admin_id = Some(admin_id.to_string());
        self
    }

    pub async fn build(self) -> TestSetup {
        let predictions = Arc::new(InMemoryPredictionRepository::new());
        for prediction in &self.predictions {
            predictions.upsert(prediction).await.unwrap();
        }

        let config = Config {
            admin_id: self.admin_id,
            fight_timeout: Duration::from_secs(60),
            confirm_timeout: Duration::from_secs(100),
            ..Config::default()
        };

        TestSetup {
            fights: Arc::new(InMemoryFightRepository::with_fights(self.fights)),
            predictions,
            channel: Arc::new(ScriptedChannel::new()),
            config: Arc::new(config),
        }
    }
}

impl TestSetup {
    pub async fn predict(&self, user_id: &str) -> Result<Outcome, CollectError> {
        PredictCommand::new(
            self.fights.clone(),
            self.predictions.clone(),
            self.channel.clone(),
            self.config.clone(),
        )
        .run(&InteractionContext::new(user_id))
        .await
    }

    pub async fn results(&self, user_id: &str) -> Result<Outcome, CollectError> {
        ResultsCommand::new(self.fights.clone(), self.channel.clone(), self.config.clone())
            .run(&InteractionContext::new(user_id))
            .await
    }

    pub async fn stored_choice(&self, user_id: &str, fight_id: i64) -> Option<String> {
        self.predictions
            .find_for_user(user_id)
            .await
            .unwrap()
            .into_iter()
            .find(|prediction| prediction.fight == fight_id)
            .map(|prediction| prediction.choice.as_str().to_string())
    }

    pub async fn winner(&self, fight_id: i64) -> Option<String> {
        self.fights
            .get_fight(fight_id)
            .await
            .unwrap()
            .and_then(|fight| fight.winner)
    }
}

pub fn completed(outcome: Result<Outcome, CollectError>) -> Choices {
    match outcome {
        Ok(Outcome::Completed(choices)) => choices,
        other => panic!("expected a completed run, got {:?}", other),
    }
}
