// Public API
pub use channel::WebSocketInteractionChannel;
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{
    ChoicePayload, ConfirmPayload, ConfirmPromptPayload, FightPromptPayload, MessageType,
    WebSocketMessage,
};
pub use replies::{Reply, ReplyKind, ReplyRegistry};
pub use socket::{Connection, Inbound, MessageHandler, SocketError, SocketWrapper};

// Internal modules
mod channel;
mod connection_manager;
mod handler;
mod messages;
mod replies;
mod socket;
