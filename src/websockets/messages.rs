use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interaction::{FightPrompt, Notice};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server
    Predict,
    Results,
    Choice,
    Confirm,

    // Server -> Client
    FightPrompt,
    ChoiceRecorded,
    ConfirmPrompt,
    Notice,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoicePayload {
    pub prompt_id: Uuid,
    /// Index of the chosen option, `null` to abstain
    pub option: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPayload {
    pub prompt_id: Uuid,
    pub accepted: bool,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightPromptPayload {
    pub prompt_id: Uuid,
    pub prompt: FightPrompt,
    pub description: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceRecordedPayload {
    pub prompt: FightPrompt,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPromptPayload {
    pub prompt_id: Uuid,
    pub text: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                user_id: None,
            }),
        }
    }

    fn with_payload<T: Serialize>(message_type: MessageType, payload: &T) -> Self {
        Self::new(
            message_type,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Create a FIGHT_PROMPT message
    pub fn fight_prompt(prompt_id: Uuid, prompt: &FightPrompt, timeout_secs: u64) -> Self {
        let payload = FightPromptPayload {
            prompt_id,
            prompt: prompt.clone(),
            description: prompt.description(),
            timeout_secs,
        };
        Self::with_payload(MessageType::FightPrompt, &payload)
    }

    /// Create a CHOICE_RECORDED message
    pub fn choice_recorded(prompt: &FightPrompt) -> Self {
        let payload = ChoiceRecordedPayload {
            prompt: prompt.clone(),
            description: prompt.description(),
        };
        Self::with_payload(MessageType::ChoiceRecorded, &payload)
    }

    /// Create a CONFIRM_PROMPT message
    pub fn confirm_prompt(prompt_id: Uuid, text: &str, timeout_secs: u64) -> Self {
        let payload = ConfirmPromptPayload {
            prompt_id,
            text: text.to_string(),
            timeout_secs,
        };
        Self::with_payload(MessageType::ConfirmPrompt, &payload)
    }

    /// Create a NOTICE message
    pub fn notice(notice: &Notice) -> Self {
        Self::with_payload(MessageType::Notice, notice)
    }

    /// Create an ERROR message
    pub fn error(message: impl Into<String>) -> Self {
        let payload = ErrorPayload {
            message: message.into(),
        };
        Self::with_payload(MessageType::Error, &payload)
    }

    /// Create a CHOICE message
    pub fn choice(prompt_id: Uuid, option: Option<usize>) -> Self {
        Self::with_payload(MessageType::Choice, &ChoicePayload { prompt_id, option })
    }

    /// Create a CONFIRM message
    pub fn confirm(prompt_id: Uuid, accepted: bool) -> Self {
        Self::with_payload(MessageType::Confirm, &ConfirmPayload { prompt_id, accepted })
    }

    /// Serializes for the wire; an unserializable message becomes an empty string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
