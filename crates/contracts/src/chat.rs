//! Chat message contracts
//!
//! The chat protocol itself lives outside the relay. Bridges translate their
//! native events into [`ChatMessage`] and hand them to a [`MessageConsumer`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Message type discriminator, numbered like the upstream chat SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum MessageKind {
    /// Type code `1`
    Text,
    /// Anything else (images, voice, cards ...)
    Other(u32),
}

impl MessageKind {
    pub const TEXT_CODE: u32 = 1;

    pub fn is_text(self) -> bool {
        matches!(self, MessageKind::Text)
    }
}

impl From<u32> for MessageKind {
    fn from(code: u32) -> Self {
        if code == Self::TEXT_CODE {
            MessageKind::Text
        } else {
            MessageKind::Other(code)
        }
    }
}

impl From<MessageKind> for u32 {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Text => MessageKind::TEXT_CODE,
            MessageKind::Other(code) => code,
        }
    }
}

/// A chat message as delivered by a bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender display name
    pub sender: String,

    /// Room topic, `None` for direct conversations
    #[serde(default)]
    pub room_topic: Option<String>,

    /// Raw content, may still carry HTML-like markup
    pub content: String,

    /// Message type
    pub kind: MessageKind,

    /// Receive time, stamped by the bridge (or on arrival when absent)
    #[serde(default = "Local::now")]
    pub received_at: DateTime<Local>,
}

impl ChatMessage {
    /// Text message helper, stamped with the current time
    pub fn text(
        sender: impl Into<String>,
        room_topic: Option<&str>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            room_topic: room_topic.map(str::to_string),
            content: content.into(),
            kind: MessageKind::Text,
            received_at: Local::now(),
        }
    }

    pub fn is_room_message(&self) -> bool {
        self.room_topic.is_some()
    }
}

/// Message consumer trait
///
/// Invoked by an external event source for every incoming message. The
/// consumer's responsibility starts at "message received"; transport faults
/// belong to the source.
#[trait_variant::make(MessageConsumer: Send)]
pub trait LocalMessageConsumer {
    /// Handle one incoming message
    async fn on_message(&mut self, message: ChatMessage);
}
