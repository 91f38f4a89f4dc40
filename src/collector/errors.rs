use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::bracket::BracketError;
use crate::interaction::InteractionError;
use crate::shared::AppError;

/// Why a commit strategy refused or failed to persist a choice
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("the deadline for fight {fight_id} passed at {deadline}")]
    PastDeadline {
        fight_id: i64,
        deadline: DateTime<Utc>,
    },

    #[error(transparent)]
    Store(#[from] AppError),
}

/// Why a collection run stopped before exhausting its fights
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no response for fight {fight_id} before the timeout")]
    TimedOut { fight_id: i64 },

    #[error("the deadline for fight {fight_id} has passed")]
    PastDeadline { fight_id: i64 },

    #[error(transparent)]
    Transport(#[from] InteractionError),

    #[error("malformed bracket: {0}")]
    MalformedBracket(#[from] BracketError),

    #[error("fight {fight_id} has {count} contestants, more than can be presented")]
    TooManyContestants { fight_id: i64, count: usize },

    #[error("option {index} does not exist for fight {fight_id}")]
    InvalidSelection { fight_id: i64, index: usize },

    #[error(transparent)]
    Store(AppError),
}

impl From<CommitError> for CollectError {
    fn from(error: CommitError) -> Self {
        match error {
            CommitError::PastDeadline { fight_id, .. } => CollectError::PastDeadline { fight_id },
            CommitError::Store(error) => CollectError::Store(error),
        }
    }
}
