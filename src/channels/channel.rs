//! Channel trait and message types.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;
use crate::intake::{EventKind, KeyboardHint, SessionId};

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Unique id for log correlation.
    pub id: Uuid,
    /// Channel name ("telegram", "cli", ...).
    pub channel: String,
    /// Sender identity on the channel.
    pub user_id: String,
    /// Display name, if the channel provides one.
    pub user_name: Option<String>,
    /// Conversation key on the channel (chat id). One session per key.
    pub conversation_id: String,
    /// Text, photo/document attachment, or something else.
    pub kind: EventKind,
    /// Text or caption. Empty for attachments without a caption.
    pub content: String,
    /// Channel-specific data needed to reply.
    pub metadata: serde_json::Value,
    /// When the channel handed the message over. Used to log queueing delay.
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    /// A text message. The conversation defaults to the sender.
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: None,
            conversation_id: user_id.to_string(),
            kind: EventKind::Text,
            content: content.to_string(),
            metadata: serde_json::Value::Null,
            received_at: Utc::now(),
        }
    }

    /// A photo or document attachment.
    pub fn document(channel: &str, user_id: &str) -> Self {
        Self::new(channel, user_id, "").with_kind(EventKind::Document)
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = conversation_id.to_string();
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    /// The session this message belongs to.
    pub fn session_id(&self) -> SessionId {
        SessionId::new(&self.channel, &self.conversation_id)
    }
}

/// A reply sent back through a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
    pub keyboard: Option<KeyboardHint>,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Option<KeyboardHint>) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// Transient status shown while a slow collaborator runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// "Typing..." indicator.
    Typing,
    /// A short informational line.
    Status(String),
}

/// Stream of inbound messages from one or more channels.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A messaging transport.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name; must match `IncomingMessage::channel` of its messages.
    fn name(&self) -> &str;

    /// Start receiving. The stream ends when the channel stops.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a reply into the conversation `msg` came from.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Show a status indicator. Channels without one do nothing.
    async fn send_status(
        &self,
        _msg: &IncomingMessage,
        _status: StatusUpdate,
    ) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
