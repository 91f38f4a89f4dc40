//! User-facing flows that drive the collector: prediction and result entry.

pub mod predict;
pub mod results;

pub use predict::PredictCommand;
pub use results::ResultsCommand;

use tracing::{error, warn};

use crate::collector::{Choices, CollectError};
use crate::interaction::{InteractionChannel, InteractionContext, Notice, Response};
use std::time::Duration;

pub const COMPLETION_TEXT: &str = "You have finished predicting the outcome of all currently available fights.\n\nYou may check on your choices or make changes to them using the `/predict` command.";
pub const PAST_DEADLINE_TEXT: &str = "Sorry, the deadline to predict fights has passed";
pub const TIMED_OUT_TEXT: &str = "Timed out waiting for a response. Choices made so far have been saved; run the command again to pick up where you left off.";
pub const DECLINED_TEXT: &str = "No changes were made.";

/// How a command run ended when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No fights were available
    NothingToDo,
    Unauthorized,
    /// The user declined or ignored the confirmation gate
    Declined,
    Completed(Choices),
}

/// Asks the user whether to start; anything but an explicit yes is a no
async fn confirm_start(
    channel: &dyn InteractionChannel,
    ctx: &InteractionContext,
    text: &str,
    timeout: Duration,
) -> Result<bool, CollectError> {
    let notice = match channel.confirm(ctx, text, timeout).await? {
        Response::Selected(0) => return Ok(true),
        Response::TimedOut => Notice::info(TIMED_OUT_TEXT),
        _ => Notice::info(DECLINED_TEXT),
    };
    channel.notify(ctx, notice).await?;
    Ok(false)
}

/// Tells the user why the run stopped; a failing channel is only logged
async fn report_failure(
    channel: &dyn InteractionChannel,
    ctx: &InteractionContext,
    failure: &CollectError,
) {
    let notice = match failure {
        CollectError::TimedOut { .. } => Notice::info(TIMED_OUT_TEXT),
        CollectError::PastDeadline { .. } => Notice::failure(PAST_DEADLINE_TEXT),
        CollectError::Transport(_) => {
            warn!(user = %ctx.user_id, error = %failure, "Run aborted by transport failure");
            return;
        }
        other => Notice::failure(format!("Something went wrong: {}", other)),
    };

    if let Err(e) = channel.notify(ctx, notice).await {
        error!(user = %ctx.user_id, error = %e, "Failed to report run failure");
    }
}
