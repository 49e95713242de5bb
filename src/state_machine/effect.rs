//! Effects produced by state transitions

use crate::keyboard::InlineKeyboard;
use crate::update::MessageId;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a new message carrying an inline keyboard
    SendPrompt {
        text: String,
        keyboard: InlineKeyboard,
    },

    /// Edit an earlier message in place
    EditMessage { message_id: MessageId, text: String },

    /// Acknowledge a button press so the client can dismiss its spinner
    AckButton { query_id: String },

    /// Store the new state and publish it to observers
    PublishState,

    /// Tear down the session after the remaining effects run
    EndSession,
}

impl Effect {
    pub fn send_prompt(text: impl Into<String>, keyboard: InlineKeyboard) -> Self {
        Effect::SendPrompt {
            text: text.into(),
            keyboard,
        }
    }

    pub fn edit(message_id: MessageId, text: impl Into<String>) -> Self {
        Effect::EditMessage {
            message_id,
            text: text.into(),
        }
    }

    pub fn ack(query_id: impl Into<String>) -> Self {
        Effect::AckButton {
            query_id: query_id.into(),
        }
    }
}
