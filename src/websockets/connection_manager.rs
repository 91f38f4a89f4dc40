use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::interaction::InteractionError;

#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Registers the user's socket, replacing any earlier one, and returns its connection id
    async fn add_connection(&self, user_id: String, sender: mpsc::UnboundedSender<String>) -> Uuid;

    /// Removes the user's socket only while `connection_id` is still the registered one
    ///
    /// Returns false when a newer connection has taken over.
    async fn remove_connection(&self, user_id: &str, connection_id: Uuid) -> bool;

    /// Queues `message` on the user's socket
    async fn send_to_user(&self, user_id: &str, message: &str) -> Result<(), InteractionError>;
}

struct Registration {
    connection_id: Uuid,
    sender: mpsc::UnboundedSender<String>,
}

pub struct InMemoryConnectionManager {
    // user id -> current socket
    connections: Arc<RwLock<HashMap<String, Registration>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, user_id: String, sender: mpsc::UnboundedSender<String>) -> Uuid {
        let connection_id = Uuid::new_v4();
        let mut connections = self.connections.write().await;
        let registration = Registration {
            connection_id,
            sender,
        };
        if let Some(previous) = connections.insert(user_id.clone(), registration) {
            debug!(
                user = %user_id,
                previous = %previous.connection_id,
                current = %connection_id,
                "Replaced existing connection"
            );
        }
        connection_id
    }

    async fn remove_connection(&self, user_id: &str, connection_id: Uuid) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(user_id) {
            Some(current) if current.connection_id == connection_id => {
                connections.remove(user_id);
                true
            }
            _ => {
                debug!(user = %user_id, connection = %connection_id, "Connection already superseded");
                false
            }
        }
    }

    async fn send_to_user(&self, user_id: &str, message: &str) -> Result<(), InteractionError> {
        let connections = self.connections.read().await;
        let registration = connections
            .get(user_id)
            .ok_or_else(|| InteractionError::NotConnected(user_id.to_string()))?;

        registration
            .sender
            .send(message.to_string())
            .map_err(|e| InteractionError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_to_connected_user() {
        let manager = InMemoryConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.add_connection("alice".to_string(), tx).await;

        manager.send_to_user("alice", "hello").await.unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_send_to_missing_user_fails() {
        let manager = InMemoryConnectionManager::new();
        assert_eq!(
            manager.send_to_user("bob", "hello").await,
            Err(InteractionError::NotConnected("bob".to_string()))
        );
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped_is_transport_error() {
        let manager = InMemoryConnectionManager::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = manager.add_connection("alice".to_string(), tx).await;
        drop(rx);

        assert!(matches!(
            manager.send_to_user("alice", "hello").await,
            Err(InteractionError::Transport(_))
        ));

        assert!(manager.remove_connection("alice", connection_id).await);
        assert_eq!(
            manager.send_to_user("alice", "hello").await,
            Err(InteractionError::NotConnected("alice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_stale_connection_cannot_remove_reconnected_user() {
        let manager = InMemoryConnectionManager::new();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        let old_id = manager.add_connection("alice".to_string(), old_tx).await;
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        let new_id = manager.add_connection("alice".to_string(), new_tx).await;
        assert_ne!(old_id, new_id);

        // The replaced socket sees its outbound channel close and tears down
        assert_eq!(old_rx.recv().await, None);
        assert!(!manager.remove_connection("alice", old_id).await);

        manager.send_to_user("alice", "still here").await.unwrap();
        assert_eq!(new_rx.recv().await.as_deref(), Some("still here"));

        assert!(manager.remove_connection("alice", new_id).await);
    }
}
