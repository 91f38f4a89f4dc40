use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{confirm_start, report_failure, Outcome, COMPLETION_TEXT};
use crate::collector::{Choices, CollectError, Collector, ResultCommit};
use crate::config::Config;
use crate::fight::{FightFilter, FightRepository};
use crate::interaction::{InteractionChannel, InteractionContext, Notice};
use crate::prediction::Choice;

pub const NO_FIGHTS_TEXT: &str = "There are no fights available at the moment.";

/// Lets the admin record the winner of every fight without a result
pub struct ResultsCommand {
    fight_repository: Arc<dyn FightRepository + Send + Sync>,
    channel: Arc<dyn InteractionChannel>,
    config: Arc<Config>,
}

impl ResultsCommand {
    pub fn new(
        fight_repository: Arc<dyn FightRepository + Send + Sync>,
        channel: Arc<dyn InteractionChannel>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            fight_repository,
            channel,
            config,
        }
    }

    #[instrument(skip(self, ctx), fields(user = %ctx.user_id))]
    pub async fn run(&self, ctx: &InteractionContext) -> Result<Outcome, CollectError> {
        if !self.config.is_admin(&ctx.user_id) {
            warn!("Result entry refused for non-admin");
            let admin = self.config.admin_id.as_deref().unwrap_or_default();
            self.channel
                .notify(
                    ctx,
                    Notice::failure(format!("Only {} can run that command", admin)),
                )
                .await?;
            return Ok(Outcome::Unauthorized);
        }

        let fights = self
            .fight_repository
            .find_fights(FightFilter::Unresolved)
            .await
            .map_err(CollectError::Store)?;

        if fights.is_empty() {
            self.channel.notify(ctx, Notice::info(NO_FIGHTS_TEXT)).await?;
            return Ok(Outcome::NothingToDo);
        }

        let question = format!(
            "{} fight card(s) are awaiting results. Start entering them now?",
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

        let recorded = self.recorded_winners().await?;
        let collector = Collector::new(self.channel.clone(), self.config.fight_timeout);
        let commit = ResultCommit::new(self.fight_repository.clone());

        match collector.collect(ctx, fights, recorded, &commit).await {
            Ok(choices) => {
                info!(choices = choices.len(), "Result entry complete");
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

    /// Winners already stored, used as the defaults for a restarted run
    async fn recorded_winners(&self) -> Result<Choices, CollectError> {
        let resolved = self
            .fight_repository
            .find_fights(FightFilter::Resolved)
            .await
            .map_err(CollectError::Store)?;

        Ok(resolved
            .into_iter()
            .filter_map(|fight| fight.winner.map(|winner| (fight.id, Choice::from(winner))))
            .collect())
    }
}
