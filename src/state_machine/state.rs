//! Conversation state types

use crate::update::ChatId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation state of one chat
///
/// `Finished` is terminal: no button token leads out of it. A new
/// conversation can only begin through the `/start` entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Initial state, entered on `/start`
    #[default]
    Start,

    /// Intermediate state
    Intermediate,

    /// Terminal state, the conversation is over
    Finished,
}

impl ChatState {
    /// Check if this is a terminal state (cannot transition out via tokens)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatState::Finished)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatState::Start => "start",
            ChatState::Intermediate => "intermediate",
            ChatState::Finished => "finished",
        }
    }
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context for a chat session (immutable configuration)
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub chat_id: ChatId,
    pub started_at: DateTime<Utc>,
}

impl ChatContext {
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            started_at: Utc::now(),
        }
    }
}
