use async_trait::async_trait;
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commands::{PredictCommand, ResultsCommand};
use crate::interaction::{InteractionChannel, InteractionContext};
use crate::shared::{AppError, AppState};
use crate::websockets::channel::WebSocketInteractionChannel;
use crate::websockets::messages::{ChoicePayload, ConfirmPayload, MessageType, WebSocketMessage};
use crate::websockets::replies::Reply;

use super::socket::{Connection, MessageHandler};

/// Message handler for receiving WebSocket messages from the client
///
/// Commands are spawned onto their own task so the socket keeps reading the
/// replies they wait for.
pub struct WebsocketReceiveHandler {
    app_state: AppState,
}

impl WebsocketReceiveHandler {
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    fn channel(&self) -> Arc<dyn InteractionChannel> {
        Arc::new(WebSocketInteractionChannel::new(
            self.app_state.connection_manager.clone(),
            self.app_state.replies.clone(),
        ))
    }

    fn spawn_predict(&self, user_id: &str) {
        let command = PredictCommand::new(
            self.app_state.fight_repository.clone(),
            self.app_state.prediction_repository.clone(),
            self.channel(),
            self.app_state.config.clone(),
        );
        let ctx = InteractionContext::new(user_id);
        tokio::spawn(async move {
            match command.run(&ctx).await {
                Ok(outcome) => debug!(user = %ctx.user_id, outcome = ?outcome, "Predict finished"),
                Err(e) => info!(user = %ctx.user_id, error = %e, "Predict ended early"),
            }
        });
    }

    fn spawn_results(&self, user_id: &str) {
        let command = ResultsCommand::new(
            self.app_state.fight_repository.clone(),
            self.channel(),
            self.app_state.config.clone(),
        );
        let ctx = InteractionContext::new(user_id);
        tokio::spawn(async move {
            match command.run(&ctx).await {
                Ok(outcome) => debug!(user = %ctx.user_id, outcome = ?outcome, "Results finished"),
                Err(e) => info!(user = %ctx.user_id, error = %e, "Results ended early"),
            }
        });
    }

    async fn deliver(&self, user_id: &str, prompt_id: Uuid, reply: Reply) {
        if !self.app_state.replies.resolve(user_id, prompt_id, reply).await {
            warn!(user = %user_id, prompt_id = %prompt_id, "Reply does not match a pending prompt");
            self.send_error(user_id, "That prompt is no longer waiting for an answer")
                .await;
        }
    }

    async fn send_error(&self, user_id: &str, message: &str) {
        let error = WebSocketMessage::error(message);
        if let Err(e) = self
            .app_state
            .connection_manager
            .send_to_user(user_id, &error.to_json())
            .await
        {
            debug!(user = %user_id, error = %e, "Could not deliver error message");
        }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, user_id: &str, message: String) {
        info!(
            user = %user_id,
            message = %message,
            "Received message"
        );

        let ws_message = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(ws_message) => ws_message,
            Err(e) => {
                warn!(
                    user = %user_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.send_error(user_id, "Malformed message").await;
                return;
            }
        };

        match ws_message.message_type {
            MessageType::Predict => self.spawn_predict(user_id),
            MessageType::Results => self.spawn_results(user_id),
            MessageType::Choice => {
                match serde_json::from_value::<ChoicePayload>(ws_message.payload) {
                    Ok(payload) => {
                        self.deliver(user_id, payload.prompt_id, Reply::Choice(payload.option))
                            .await
                    }
                    Err(e) => {
                        warn!(user = %user_id, error = %e, "Invalid CHOICE payload");
                        self.send_error(user_id, "Invalid CHOICE payload").await;
                    }
                }
            }
            MessageType::Confirm => {
                match serde_json::from_value::<ConfirmPayload>(ws_message.payload) {
                    Ok(payload) => {
                        self.deliver(user_id, payload.prompt_id, Reply::Confirm(payload.accepted))
                            .await
                    }
                    Err(e) => {
                        warn!(user = %user_id, error = %e, "Invalid CONFIRM payload");
                        self.send_error(user_id, "Invalid CONFIRM payload").await;
                    }
                }
            }
            other => {
                debug!(message_type = ?other, "Unhandled message type");
                self.send_error(user_id, "Unsupported message type").await;
            }
        }
    }
}

/// WebSocket endpoint for one user
/// GET /ws/{user_id}
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(user_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let user_id = user_id.trim().to_string();
    if user_id.is_empty() {
        warn!("WebSocket requested without a user id");
        return Err(AppError::Unauthorized("Missing user id".to_string()));
    }

    info!(user = %user_id, "WebSocket connection requested");
    Ok(ws.on_upgrade(move |socket| handle_websocket_connection(socket, user_id, app_state)))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    user_id: String,
    app_state: AppState,
) {
    info!(user = %user_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    let connection_id = app_state
        .connection_manager
        .add_connection(user_id.clone(), outbound_sender)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(app_state.clone()));
    let connection = Connection::new(
        user_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match connection.run().await {
        Ok(()) => info!(user = %user_id, "WebSocket connection closed cleanly"),
        Err(e) => warn!(user = %user_id, error = ?e, "WebSocket connection error"),
    }

    release_connection(&app_state, &user_id, connection_id).await;
}

/// Drops this socket's registration; pending prompts are cancelled only when no
/// newer socket has taken over the user
async fn release_connection(app_state: &AppState, user_id: &str, connection_id: Uuid) {
    if app_state
        .connection_manager
        .remove_connection(user_id, connection_id)
        .await
    {
        app_state.replies.cancel_user(user_id).await;
    } else {
        debug!(user = %user_id, "Superseded socket closed, keeping pending prompts");
    }
}
