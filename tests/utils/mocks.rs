use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

use bracketboi::interaction::{
    FightPrompt, InteractionChannel, InteractionContext, InteractionError, Notice, Response,
};
use bracketboi::websockets::{ConnectionManager, InMemoryConnectionManager, WebSocketMessage};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Answers prompts from a script; an exhausted script behaves like a timeout
#[derive(Default)]
pub struct ScriptedChannel {
    confirmations: Mutex<VecDeque<Response>>,
    answers: Mutex<VecDeque<Result<Response, InteractionError>>>,
    presented: Mutex<Vec<FightPrompt>>,
    reflected: Mutex<Vec<FightPrompt>>,
    notices: Mutex<Vec<Notice>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn confirm_with(&self, response: Response) {
        self.confirmations.lock().await.push_back(response);
    }

    pub async fn answer(&self, response: Response) {
        self.answers.lock().await.push_back(Ok(response));
    }

    pub async fn answer_all(&self, responses: Vec<Response>) {
        for response in responses {
            self.answer(response).await;
        }
    }

    pub async fn fail_with(&self, error: InteractionError) {
        self.answers.lock().await.push_back(Err(error));
    }

    pub async fn presented(&self) -> Vec<FightPrompt> {
        self.presented.lock().await.clone()
    }

    pub async fn presented_ids(&self) -> Vec<i64> {
        self.presented
            .lock()
            .await
            .iter()
            .map(|prompt| prompt.fight_id)
            .collect()
    }

    pub async fn reflected(&self) -> Vec<FightPrompt> {
        self.reflected.lock().await.clone()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.lock().await.clone()
    }

    pub async fn last_notice_text(&self) -> Option<String> {
        self.notices.lock().await.last().map(|notice| notice.text.clone())
    }
}

#[async_trait]
impl InteractionChannel for ScriptedChannel {
    async fn present_choices(
        &self,
        _ctx: &InteractionContext,
        prompt: &FightPrompt,
        _timeout: Duration,
    ) -> Result<Response, InteractionError> {
        self.presented.lock().await.push(prompt.clone());
        self.answers
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(Response::TimedOut))
    }

    async fn reflect_choice(
        &self,
        _ctx: &InteractionContext,
        prompt: &FightPrompt,
    ) -> Result<(), InteractionError> {
        self.reflected.lock().await.push(prompt.clone());
        Ok(())
    }

    async fn confirm(
        &self,
        _ctx: &InteractionContext,
        _text: &str,
        _timeout: Duration,
    ) -> Result<Response, InteractionError> {
        Ok(self
            .confirmations
            .lock()
            .await
            .pop_front()
            .unwrap_or(Response::Selected(0)))
    }

    async fn notify(
        &self,
        _ctx: &InteractionContext,
        notice: Notice,
    ) -> Result<(), InteractionError> {
        self.notices.lock().await.push(notice);
        Ok(())
    }
}

/// A registered user whose outbound socket messages can be read back
pub struct RecordingConnection {
    receiver: mpsc::UnboundedReceiver<String>,
}

impl RecordingConnection {
    pub async fn register(manager: &InMemoryConnectionManager, user_id: &str) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        manager.add_connection(user_id.to_string(), sender).await;
        Self { receiver }
    }

    /// Next message sent to the user, failing the test after a second
    pub async fn next_message(&mut self) -> WebSocketMessage {
        let raw = tokio::time::timeout(Duration::from_secs(1), self.receiver.recv())
            .await
            .expect("no message within a second")
            .expect("connection closed");
        serde_json::from_str(&raw).expect("message is valid JSON")
    }

    pub fn try_next_message(&mut self) -> Option<WebSocketMessage> {
        self.receiver
            .try_recv()
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }
}
