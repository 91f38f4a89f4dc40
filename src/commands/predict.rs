use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use super::{confirm_start, report_failure, Outcome, COMPLETION_TEXT};
use crate::collector::{choices_from_predictions, CollectError, Collector, PredictionCommit};
use crate::config::Config;
use crate::fight::{FightFilter, FightRepository};
use crate::interaction::{InteractionChannel, InteractionContext, Notice};
use crate::prediction::PredictionRepository;

pub const NO_FIGHTS_TEXT: &str = "There are no fights to predict at the moment.";

/// Walks a user through every fight still open for prediction
pub struct PredictCommand {
    fight_repository: Arc<dyn FightRepository + Send + Sync>,
    prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
    channel: Arc<dyn InteractionChannel>,
    config: Arc<Config>,
}

impl PredictCommand {
    pub fn new(
        fight_repository: Arc<dyn FightRepository + Send + Sync>,
        prediction_repository: Arc<dyn PredictionRepository + Send + Sync>,
        channel: Arc<dyn InteractionChannel>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            fight_repository,
            prediction_repository,
            channel,
            config,
        }
    }

    #[instrument(skip(self, ctx), fields(user = %ctx.user_id))]
    pub async fn run(&self, ctx: &InteractionContext) -> Result<Outcome, CollectError> {
        let fights = self
            .fight_repository
            .find_fights(FightFilter::OpenAt(Utc::now()))
            .await
            .map_err(CollectError::Store)?;

        if fights.is_empty() {
            self.channel.notify(ctx, Notice::info(NO_FIGHTS_TEXT)).await?;
            return Ok(Outcome::NothingToDo);
        }

        let question = format!(
            "{} fight card(s) are open for prediction. Start predicting now?",
            fights.len()
        );
        if !confirm_start(
            self.channel.as_ref(),
            ctx,
            &question,
            self.config.confirm_timeout,
        )
        .await?
        {
            return Ok(Outcome::Declined);
        }

        let existing = self
            .prediction_repository
            .find_for_user(&ctx.user_id)
            .await
            .map_err(CollectError::Store)?;

        let collector = Collector::new(self.channel.clone(), self.config.fight_timeout);
        let commit = PredictionCommit::new(self.prediction_repository.clone());

        match collector
            .collect(ctx, fights, choices_from_predictions(&existing), &commit)
            .await
        {
            Ok(choices) => {
                info!(choices = choices.len(), "Predictions complete");
                self.channel
                    .notify(ctx, Notice::success(COMPLETION_TEXT))
                    .await?;
                Ok(Outcome::Completed(choices))
            }
            Err(e) => {
                report_failure(self.channel.as_ref(), ctx, &e).await;
                Err(e)
            }
        }
    }
}
