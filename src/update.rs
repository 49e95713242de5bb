//! Inbound update model
//!
//! Updates are what a frontend feeds into the dispatcher: a command the
//! user typed, or a callback query fired by pressing an inline-keyboard
//! button. The chat platform that produced them is not our concern.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a chat (one conversation partner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message within a chat, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub chat_id: ChatId,
    pub kind: UpdateKind,
}

/// What kind of update arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// A slash command, name given without the leading `/`.
    Command { name: String },
    /// An inline-keyboard button press. `message_id` is the message that
    /// carried the keyboard; `token` is the opaque callback payload bound
    /// to the pressed button.
    CallbackQuery {
        query_id: String,
        message_id: MessageId,
        token: String,
    },
}

impl Update {
    pub fn command(chat_id: ChatId, name: impl Into<String>) -> Self {
        Self {
            chat_id,
            kind: UpdateKind::Command { name: name.into() },
        }
    }

    pub fn callback_query(
        chat_id: ChatId,
        query_id: impl Into<String>,
        message_id: MessageId,
        token: impl Into<String>,
    ) -> Self {
        Self {
            chat_id,
            kind: UpdateKind::CallbackQuery {
                query_id: query_id.into(),
                message_id,
                token: token.into(),
            },
        }
    }

    /// Parse a console input line into an update for `chat_id`.
    ///
    /// `/name` becomes a command; a bare word becomes a button press
    /// against `keyboard_message`, when one is on screen. Returns `None`
    /// for blank input or a bare word with no keyboard to press.
    pub fn parse_line(
        chat_id: ChatId,
        line: &str,
        keyboard_message: Option<MessageId>,
    ) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(name) = line.strip_prefix('/') {
            return Some(Self::command(chat_id, name));
        }

        let message_id = keyboard_message?;
        let query_id = uuid::Uuid::new_v4().to_string();
        Some(Self::callback_query(chat_id, query_id, message_id, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_line() {
        let update = Update::parse_line(ChatId(7), "/start", None).unwrap();
        assert_eq!(
            update.kind,
            UpdateKind::Command {
                name: "start".to_string()
            }
        );
        assert_eq!(update.chat_id, ChatId(7));
    }

    #[test]
    fn parse_token_requires_keyboard() {
        assert!(Update::parse_line(ChatId(7), "middle", None).is_none());

        let update = Update::parse_line(ChatId(7), "middle", Some(MessageId(3))).unwrap();
        match update.kind {
            UpdateKind::CallbackQuery {
                message_id, token, ..
            } => {
                assert_eq!(message_id, MessageId(3));
                assert_eq!(token, "middle");
            }
            UpdateKind::Command { .. } => panic!("expected callback query"),
        }
    }

    #[test]
    fn parse_blank_line_is_none() {
        assert!(Update::parse_line(ChatId(1), "   ", Some(MessageId(1))).is_none());
    }
}
