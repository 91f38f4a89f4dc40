pub mod prompt;

pub use prompt::{FightPrompt, OptionMarker, PromptOption};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Who a collection run is talking to
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionContext {
    pub user_id: String,
}

impl InteractionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Outcome of waiting for a single user response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Index into the presented options
    Selected(usize),
    Abstained,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeLevel {
    Info,
    Success,
    Failure,
}

/// Informational message sent outside of a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InteractionError {
    #[error("user {0} is not connected")]
    NotConnected(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Messaging seam between the engine and whatever the user is typing into
#[async_trait]
pub trait InteractionChannel: Send + Sync {
    /// Shows a fight and waits up to `timeout` for one answer from the context's user
    async fn present_choices(
        &self,
        ctx: &InteractionContext,
        prompt: &FightPrompt,
        timeout: Duration,
    ) -> Result<Response, InteractionError>;

    /// Re-renders a prompt after its choice was recorded
    async fn reflect_choice(
        &self,
        ctx: &InteractionContext,
        prompt: &FightPrompt,
    ) -> Result<(), InteractionError>;

    /// Asks a yes/no question; option 0 is "yes"
    async fn confirm(
        &self,
        ctx: &InteractionContext,
        text: &str,
        timeout: Duration,
    ) -> Result<Response, InteractionError>;

    async fn notify(&self, ctx: &InteractionContext, notice: Notice)
        -> Result<(), InteractionError>;
}
