use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::connection_manager::ConnectionManager;
use super::messages::WebSocketMessage;
use super::replies::{Reply, ReplyKind, ReplyRegistry};
use crate::interaction::{
    FightPrompt, InteractionChannel, InteractionContext, InteractionError, Notice, Response,
};

/// Interaction channel backed by the user's websocket connection
pub struct WebSocketInteractionChannel {
    connection_manager: Arc<dyn ConnectionManager>,
    replies: ReplyRegistry,
}

impl WebSocketInteractionChannel {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, replies: ReplyRegistry) -> Self {
        Self {
            connection_manager,
            replies,
        }
    }

    async fn send(&self, ctx: &InteractionContext, message: WebSocketMessage) -> Result<(), InteractionError> {
        self.connection_manager
            .send_to_user(&ctx.user_id, &message.to_json())
            .await
    }

    /// Sends the message built for a fresh prompt id and waits for its reply
    async fn ask(
        &self,
        ctx: &InteractionContext,
        kind: ReplyKind,
        timeout: Duration,
        build: impl FnOnce(uuid::Uuid) -> WebSocketMessage + Send,
    ) -> Result<Option<Reply>, InteractionError> {
        let (prompt_id, receiver) = self.replies.register(&ctx.user_id, kind).await;

        if let Err(e) = self.send(ctx, build(prompt_id)).await {
            self.replies.cancel(&ctx.user_id, prompt_id).await;
            return Err(e);
        }

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(reply)) => Ok(Some(reply)),
            Ok(Err(_)) => {
                warn!(user = %ctx.user_id, prompt_id = %prompt_id, "Prompt dropped before a reply");
                Err(InteractionError::Transport(
                    "prompt was cancelled before a reply arrived".to_string(),
                ))
            }
            Err(_) => {
                debug!(user = %ctx.user_id, prompt_id = %prompt_id, "Prompt timed out");
                self.replies.cancel(&ctx.user_id, prompt_id).await;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl InteractionChannel for WebSocketInteractionChannel {
    #[instrument(skip(self, ctx, prompt, timeout), fields(user = %ctx.user_id, fight_id = prompt.fight_id))]
    async fn present_choices(
        &self,
        ctx: &InteractionContext,
        prompt: &FightPrompt,
        timeout: Duration,
    ) -> Result<Response, InteractionError> {
        let reply = self
            .ask(ctx, ReplyKind::Choice, timeout, |prompt_id| {
                WebSocketMessage::fight_prompt(prompt_id, prompt, timeout.as_secs())
            })
            .await?;

        Ok(match reply {
            Some(Reply::Choice(Some(index))) => Response::Selected(index),
            Some(Reply::Choice(None)) => Response::Abstained,
            Some(Reply::Confirm(_)) | None => Response::TimedOut,
        })
    }

    async fn reflect_choice(
        &self,
        ctx: &InteractionContext,
        prompt: &FightPrompt,
    ) -> Result<(), InteractionError> {
        self.send(ctx, WebSocketMessage::choice_recorded(prompt)).await
    }

    #[instrument(skip(self, ctx, text, timeout), fields(user = %ctx.user_id))]
    async fn confirm(
        &self,
        ctx: &InteractionContext,
        text: &str,
        timeout: Duration,
    ) -> Result<Response, InteractionError> {
        let reply = self
            .ask(ctx, ReplyKind::Confirm, timeout, |prompt_id| {
                WebSocketMessage::confirm_prompt(prompt_id, text, timeout.as_secs())
            })
            .await?;

        Ok(match reply {
            Some(Reply::Confirm(true)) => Response::Selected(0),
            Some(Reply::Confirm(false)) => Response::Selected(1),
            Some(Reply::Choice(_)) | None => Response::TimedOut,
        })
    }

    async fn notify(
        &self,
        ctx: &InteractionContext,
        notice: Notice,
    ) -> Result<(), InteractionError> {
        self.send(ctx, WebSocketMessage::notice(&notice)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fight::Fight;
    use crate::websockets::messages::{FightPromptPayload, MessageType};
    use crate::websockets::InMemoryConnectionManager;
    use chrono::Utc;
    use tokio::sync::mpsc;

    async fn connected(
        user_id: &str,
    ) -> (
        Arc<WebSocketInteractionChannel>,
        ReplyRegistry,
        mpsc::UnboundedReceiver<String>,
    ) {
        let manager = Arc::new(InMemoryConnectionManager::new());
        let (tx, rx) = mpsc::unbounded_channel();
        manager.add_connection(user_id.to_string(), tx).await;
        let replies = ReplyRegistry::new();
        let channel = Arc::new(WebSocketInteractionChannel::new(manager, replies.clone()));
        (channel, replies, rx)
    }

    fn prompt() -> FightPrompt {
        let fight = Fight::new(1, "Week 1", vec!["A".into(), "B".into()], Utc::now());
        FightPrompt::new(&fight, None).unwrap()
    }

    #[tokio::test]
    async fn test_choice_reply_resolves_prompt() {
        let (channel, replies, mut rx) = connected("alice").await;
        let ctx = InteractionContext::new("alice");

        let waiting = {
            let channel = channel.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                channel
                    .present_choices(&ctx, &prompt(), Duration::from_secs(5))
                    .await
            })
        };

        let sent: WebSocketMessage = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(sent.message_type, MessageType::FightPrompt);
        let payload: FightPromptPayload = serde_json::from_value(sent.payload).unwrap();
        assert!(replies.resolve("alice", payload.prompt_id, Reply::Choice(Some(1))).await);

        assert_eq!(waiting.await.unwrap(), Ok(Response::Selected(1)));
    }

    #[tokio::test]
    async fn test_unanswered_prompt_times_out() {
        let (channel, _replies, _rx) = connected("alice").await;

        let response = channel
            .present_choices(
                &InteractionContext::new("alice"),
                &prompt(),
                Duration::from_millis(20),
            )
            .await;

        assert_eq!(response, Ok(Response::TimedOut));
    }

    #[tokio::test]
    async fn test_disconnected_user_cannot_be_prompted() {
        let (channel, _replies, _rx) = connected("alice").await;

        let response = channel
            .confirm(&InteractionContext::new("bob"), "Ready?", Duration::from_secs(5))
            .await;

        assert_eq!(response, Err(InteractionError::NotConnected("bob".to_string())));
    }
}
