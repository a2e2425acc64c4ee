//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including the sender and the text or image payload.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message from the user.
    User,
    /// Message from the assistant (generated replies, status and failure notes).
    Assistant,
}

/// Payload kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
}

/// The payload of a message: either text or a reference to an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum MessageContent {
    Text(String),
    /// URL (or data URL) of an image.
    Image(String),
}

/// A single message in a session's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    #[serde(flatten)]
    pub content: MessageContent,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_image(reference: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: MessageContent::Image(reference.into()),
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant_image(reference: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            content: MessageContent::Image(reference.into()),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self.content {
            MessageContent::Text(_) => MessageKind::Text,
            MessageContent::Image(_) => MessageKind::Image,
        }
    }

    /// Text payload, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Image(_) => None,
        }
    }

    /// Image reference, if this is an image message.
    pub fn image(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Image(reference) => Some(reference),
            MessageContent::Text(_) => None,
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_user_text(&self) -> bool {
        self.is_from_user() && self.kind() == MessageKind::Text
    }
}
