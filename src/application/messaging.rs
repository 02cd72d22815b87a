//! Messaging client abstraction
//!
//! The request pipeline only talks to a chat transport through
//! [`MessagingClient`]; the Telegram implementation lives in
//! `infrastructure::telegram`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::domain::media::MediaPhoto;

/// Chat identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier within a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text formatting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Legacy Markdown (`*bold*`, `_italic_`)
    Markdown,
}

impl ParseMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
        }
    }
}

/// A text message received from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: Option<String>,
    pub sender_first_name: Option<String>,
}

/// One polled update; updates without a message still advance the offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

/// Transport-level failure (sending, deleting, polling)
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Messaging request '{method}' failed: {source}")]
    Request {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Messaging API rejected '{method}': {description}")]
    Api {
        method: &'static str,
        description: String,
    },

    #[error("Failed to decode '{method}' response: {message}")]
    Decode {
        method: &'static str,
        message: String,
    },
}

pub type MessagingResult<T> = Result<T, MessagingError>;

/// Generic chat transport capability
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Long-poll for updates with id >= `offset`
    async fn receive_updates(&self, offset: Option<i64>, timeout: Duration) -> MessagingResult<Vec<Update>>;

    /// Send a text message, returning its id
    async fn send_text(&self, chat_id: ChatId, text: &str, parse_mode: Option<ParseMode>) -> MessagingResult<MessageId>;

    /// Send up to ten photos as one grouped message; captions are sent as Markdown
    async fn send_media_group(&self, chat_id: ChatId, media: &[MediaPhoto]) -> MessagingResult<()>;

    /// Delete a previously sent message
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> MessagingResult<()>;
}
