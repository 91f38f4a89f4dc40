//! Walks a list of fights to completion, asking for one choice per leaf fight.
//!
//! Bracket definitions are expanded into their first round, each round is
//! resolved depth-first, and the winners are synthesized into the next round
//! until a bracket reaches its final. Work is kept on an explicit stack of
//! [`PendingItem`]s; resolved choices accumulate in a map keyed by fight id, so
//! a round can only advance once every sibling fight has an entry.

pub mod commit;
mod errors;

pub use commit::{CommitStrategy, PredictionCommit, ResultCommit};
pub use errors::{CollectError, CommitError};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::bracket::{expand_bracket, synthesize_next_round, BracketError};
use crate::fight::Fight;
use crate::interaction::{FightPrompt, InteractionChannel, InteractionContext, Response};
use crate::prediction::{Choice, Prediction};

/// Resolved choices keyed by fight id
pub type Choices = BTreeMap<i64, Choice>;

/// Builds the seed map from a user's stored predictions
pub fn choices_from_predictions(predictions: &[Prediction]) -> Choices {
    predictions
        .iter()
        .map(|prediction| (prediction.fight, prediction.choice.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PendingItem {
    Bracket(Fight),
    Leaf(Fight),
    Bye(Fight),
    /// Synthesize the next round once the bracket's sub-fights are resolved
    AdvanceRound(Fight),
}

impl PendingItem {
    pub fn classify(fight: Fight) -> Result<Self, BracketError> {
        let count = fight.bots.len();
        if count <= 1 {
            return Ok(PendingItem::Bye(fight));
        }
        if fight.is_bracket_definition() {
            if count % 2 != 0 {
                return Err(BracketError::UnevenBracket {
                    fight_id: fight.id,
                    count,
                });
            }
            return Ok(PendingItem::Bracket(fight));
        }
        Ok(PendingItem::Leaf(fight))
    }
}

pub struct Collector {
    channel: Arc<dyn InteractionChannel>,
    fight_timeout: Duration,
}

impl Collector {
    pub fn new(channel: Arc<dyn InteractionChannel>, fight_timeout: Duration) -> Self {
        Self {
            channel,
            fight_timeout,
        }
    }

    /// Resolves every fight in `fights`, including all rounds generated from brackets
    ///
    /// `choices` seeds the defaults shown to the user and is returned with every
    /// new choice applied. The first timeout or failure ends the run; choices
    /// committed before it stay committed.
    #[instrument(skip_all, fields(user = %ctx.user_id, fights = fights.len()))]
    pub async fn collect(
        &self,
        ctx: &InteractionContext,
        fights: Vec<Fight>,
        mut choices: Choices,
        commit: &dyn CommitStrategy,
    ) -> Result<Choices, CollectError> {
        let mut stack = Vec::with_capacity(fights.len());
        for fight in fights.into_iter().rev() {
            stack.push(PendingItem::classify(fight)?);
        }

        while let Some(item) = stack.pop() {
            match item {
                PendingItem::Bracket(bracket) => {
                    let round = expand_bracket(&bracket)?;
                    debug!(
                        fight_id = bracket.id,
                        sub_fights = round.len(),
                        "Expanded bracket"
                    );
                    if bracket.bots.len() > 2 {
                        stack.push(PendingItem::AdvanceRound(bracket));
                    }
                    for fight in round.into_iter().rev() {
                        stack.push(PendingItem::classify(fight)?);
                    }
                }
                PendingItem::AdvanceRound(bracket) => {
                    if let Some(next) = synthesize_next_round(&bracket, &choices)? {
                        debug!(
                            fight_id = next.id,
                            name = %next.name,
                            bots = next.bots.len(),
                            "Synthesized next round"
                        );
                        stack.push(PendingItem::classify(next)?);
                    }
                }
                PendingItem::Bye(fight) => {
                    let choice = fight
                        .bots
                        .first()
                        .map(|bot| Choice::from(bot.clone()))
                        .unwrap_or(Choice::Abstain);
                    debug!(fight_id = fight.id, choice = %choice, "Bye resolved automatically");
                    choices.insert(fight.id, choice);
                }
                PendingItem::Leaf(fight) => {
                    self.resolve_leaf(ctx, &fight, &mut choices, commit).await?;
                }
            }
        }

        info!(choices = choices.len(), "Collection finished");
        Ok(choices)
    }

    async fn resolve_leaf(
        &self,
        ctx: &InteractionContext,
        fight: &Fight,
        choices: &mut Choices,
        commit: &dyn CommitStrategy,
    ) -> Result<(), CollectError> {
        let prompt = FightPrompt::new(fight, choices.get(&fight.id)).ok_or(
            CollectError::TooManyContestants {
                fight_id: fight.id,
                count: fight.bots.len(),
            },
        )?;

        let response = self
            .channel
            .present_choices(ctx, &prompt, self.fight_timeout)
            .await
            .map_err(|e| {
                error!(fight_id = fight.id, error = %e, "Failed to collect choice");
                e
            })?;

        let choice = match response {
            Response::TimedOut => {
                info!(fight_id = fight.id, "No response before timeout");
                return Err(CollectError::TimedOut { fight_id: fight.id });
            }
            Response::Abstained => Choice::Abstain,
            Response::Selected(index) => {
                prompt
                    .choice_for(Some(index))
                    .ok_or(CollectError::InvalidSelection {
                        fight_id: fight.id,
                        index,
                    })?
            }
        };

        let prediction = Prediction::new(ctx.user_id.clone(), fight.id, choice.clone());
        commit.commit(fight, &prediction).await.map_err(|e| {
            warn!(fight_id = fight.id, error = %e, "Commit rejected");
            e
        })?;
        choices.insert(fight.id, choice.clone());

        self.channel
            .reflect_choice(ctx, &prompt.with_choice(&choice))
            .await?;
        Ok(())
    }
}
