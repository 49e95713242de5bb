//! Events that can occur in a chat session

use crate::update::MessageId;

/// Action bound to an inline-keyboard button, parsed from its opaque
/// callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Conversation flow: go to the initial state
    Start,
    /// Conversation flow: go to the intermediate state
    Middle,
    /// Conversation flow: finish the conversation
    Finish,
    /// Greeting menu: say hello
    Hello,
    /// Greeting menu: say goodbye
    Bye,
    /// Fallback for tokens no keyboard of ours carries
    Unknown { token: String },
}

impl ButtonAction {
    /// Parse from a callback token
    pub fn from_token(token: &str) -> Self {
        match token {
            "start" => ButtonAction::Start,
            "middle" => ButtonAction::Middle,
            "finish" => ButtonAction::Finish,
            "hello" => ButtonAction::Hello,
            "bye" => ButtonAction::Bye,
            _ => ButtonAction::Unknown {
                token: token.to_string(),
            },
        }
    }

    /// Get the token this action was parsed from
    pub fn token(&self) -> &str {
        match self {
            ButtonAction::Start => "start",
            ButtonAction::Middle => "middle",
            ButtonAction::Finish => "finish",
            ButtonAction::Hello => "hello",
            ButtonAction::Bye => "bye",
            ButtonAction::Unknown { token } => token,
        }
    }
}

/// A slash command acting as a session entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start`: begin (or restart) the conversation flow
    Start,
    /// `/greet`: show the stateless greeting menu
    Greet,
    /// Fallback for commands we do not handle
    Unknown { name: String },
}

impl BotCommand {
    pub fn from_name(name: &str) -> Self {
        match name {
            "start" => BotCommand::Start,
            "greet" => BotCommand::Greet,
            _ => BotCommand::Unknown {
                name: name.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Greet => "greet",
            BotCommand::Unknown { name } => name,
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A command arrived for this chat
    Command { command: BotCommand },

    /// An inline-keyboard button was pressed. `message_id` is the message
    /// carrying the keyboard, so the reply can edit it in place.
    ButtonPress {
        query_id: String,
        message_id: MessageId,
        action: ButtonAction,
    },
}
