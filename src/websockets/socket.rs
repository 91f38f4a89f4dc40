use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::ops::ControlFlow;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// One read from the client side of a socket
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Text(String),
    /// Binary, ping and pong frames; the league protocol is text only
    Control,
    Closed,
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("failed to send to client: {0}")]
    Send(String),
    #[error("failed to read from client: {0}")]
    Receive(String),
}

/// The client half of a user's connection
#[async_trait]
pub trait SocketWrapper: Send {
    async fn send_text(&mut self, text: String) -> Result<(), SocketError>;

    async fn next_inbound(&mut self) -> Result<Inbound, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Receives every text frame a user sends
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, user_id: &str, message: String);
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_text(&mut self, text: String) -> Result<(), SocketError> {
        self.send(Message::Text(text))
            .await
            .map_err(|e| SocketError::Send(e.to_string()))
    }

    async fn next_inbound(&mut self) -> Result<Inbound, SocketError> {
        match self.next().await {
            Some(Ok(Message::Text(text))) => Ok(Inbound::Text(text)),
            Some(Ok(Message::Close(_))) | None => Ok(Inbound::Closed),
            Some(Ok(_)) => Ok(Inbound::Control),
            Some(Err(e)) => Err(SocketError::Receive(e.to_string())),
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::Send(e.to_string()))
    }
}

/// A user's websocket, pumping outbound messages from the ConnectionManager
/// and inbound text into the MessageHandler until either side closes
pub struct Connection {
    pub user_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        user_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            user_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Runs until the client disconnects or the outbound side is dropped
    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            let step = tokio::select! {
                outbound = self.outbound_receiver.recv() => self.forward(outbound).await?,
                inbound = self.socket.next_inbound() => self.dispatch(inbound?).await,
            };
            if step.is_break() {
                break;
            }
        }

        if let Err(e) = self.socket.close().await {
            debug!(user = %self.user_id, error = %e, "Close frame not delivered");
        }
        Ok(())
    }

    async fn forward(&mut self, outbound: Option<String>) -> Result<ControlFlow<()>, SocketError> {
        match outbound {
            Some(text) => {
                self.socket.send_text(text).await?;
                Ok(ControlFlow::Continue(()))
            }
            // Replaced by a newer socket for the same user
            None => Ok(ControlFlow::Break(())),
        }
    }

    async fn dispatch(&mut self, inbound: Inbound) -> ControlFlow<()> {
        match inbound {
            Inbound::Text(text) => {
                self.message_handler
                    .handle_message(&self.user_id, text)
                    .await;
                ControlFlow::Continue(())
            }
            Inbound::Control => ControlFlow::Continue(()),
            Inbound::Closed => ControlFlow::Break(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    struct FakeSocket {
        inbound: VecDeque<Inbound>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSocket {
        fn reading(inbound: Vec<Inbound>) -> Self {
            Self {
                inbound: inbound.into(),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl SocketWrapper for FakeSocket {
        async fn send_text(&mut self, text: String) -> Result<(), SocketError> {
            self.sent.lock().await.push(text);
            Ok(())
        }

        async fn next_inbound(&mut self) -> Result<Inbound, SocketError> {
            match self.inbound.pop_front() {
                Some(inbound) => Ok(inbound),
                // Keep the socket open so the outbound side decides when to stop
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        received: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle_message(&self, user_id: &str, message: String) {
            self.received
                .lock()
                .await
                .push((user_id.to_string(), message));
        }
    }

    #[tokio::test]
    async fn test_text_frames_reach_handler_and_control_frames_do_not() {
        let handler = Arc::new(RecordingHandler::default());
        let (_tx, rx) = mpsc::unbounded_channel();
        let socket = FakeSocket::reading(vec![
            Inbound::Text(r#"{"type":"PREDICT"}"#.to_string()),
            Inbound::Control,
            Inbound::Text(String::new()),
            Inbound::Closed,
            Inbound::Text(r#"{"type":"RESULTS"}"#.to_string()),
        ]);

        Connection::new("alice".to_string(), Box::new(socket), rx, handler.clone())
            .run()
            .await
            .unwrap();

        let received = handler.received.lock().await;
        let messages: Vec<&str> = received.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(messages, vec![r#"{"type":"PREDICT"}"#, ""]);
        assert!(received.iter().all(|(user, _)| user == "alice"));
    }

    #[tokio::test]
    async fn test_outbound_messages_are_sent_until_sender_drops() {
        let handler = Arc::new(RecordingHandler::default());
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let socket = FakeSocket::reading(Vec::new());
        let sent = socket.sent.clone();
        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();
        drop(tx);

        let result = Connection::new("alice".to_string(), Box::new(socket), rx, handler.clone())
            .run()
            .await;

        assert!(result.is_ok());
        assert_eq!(*sent.lock().await, vec!["first", "second"]);
        assert!(handler.received.lock().await.is_empty());
    }
}
