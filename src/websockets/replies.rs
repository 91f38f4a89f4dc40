use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::debug;
use uuid::Uuid;

/// A client's answer to an outstanding prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    /// Option index, `None` to abstain
    Choice(Option<usize>),
    Confirm(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyKind {
    Choice,
    Confirm,
}

impl Reply {
    fn kind(&self) -> ReplyKind {
        match self {
            Reply::Choice(_) => ReplyKind::Choice,
            Reply::Confirm(_) => ReplyKind::Confirm,
        }
    }
}

struct PendingReply {
    prompt_id: Uuid,
    kind: ReplyKind,
    sender: oneshot::Sender<Reply>,
}

/// Routes replies from a user's socket to the run waiting on them
///
/// Each user has at most one outstanding prompt. Registering a new one drops
/// the previous waiter, whose receiver then reports a closed channel.
#[derive(Clone, Default)]
pub struct ReplyRegistry {
    pending: Arc<Mutex<HashMap<String, PendingReply>>>,
}

impl ReplyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: &str, kind: ReplyKind) -> (Uuid, oneshot::Receiver<Reply>) {
        let (sender, receiver) = oneshot::channel();
        let prompt_id = Uuid::new_v4();

        let previous = self.pending.lock().await.insert(
            user_id.to_string(),
            PendingReply {
                prompt_id,
                kind,
                sender,
            },
        );
        if let Some(previous) = previous {
            debug!(user = %user_id, prompt_id = %previous.prompt_id, "Superseded pending prompt");
        }

        (prompt_id, receiver)
    }

    /// Hands `reply` to the waiter if it answers the user's current prompt
    pub async fn resolve(&self, user_id: &str, prompt_id: Uuid, reply: Reply) -> bool {
        let mut pending = self.pending.lock().await;
        let matches = pending
            .get(user_id)
            .is_some_and(|p| p.prompt_id == prompt_id && p.kind == reply.kind());
        if !matches {
            return false;
        }

        match pending.remove(user_id) {
            Some(waiter) => waiter.sender.send(reply).is_ok(),
            None => false,
        }
    }

    /// Drops the waiter for `prompt_id`, e.g. after it timed out
    pub async fn cancel(&self, user_id: &str, prompt_id: Uuid) {
        let mut pending = self.pending.lock().await;
        if pending.get(user_id).is_some_and(|p| p.prompt_id == prompt_id) {
            pending.remove(user_id);
        }
    }

    /// Drops whatever the user was being asked, e.g. on disconnect
    pub async fn cancel_user(&self, user_id: &str) {
        self.pending.lock().await.remove(user_id);
    }
}
