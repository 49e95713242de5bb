//! Flow texts and keyboards
//!
//! Everything the bot ever says, in one place, next to the keyboards that
//! go with it.

use crate::keyboard::InlineKeyboard;

// Conversation flow (/start)

pub const STATE_PROMPT: &str = "Choose a state:";
pub const STATE_START_TEXT: &str = "You are in the initial state.";
pub const STATE_INTERMEDIATE_TEXT: &str = "You have moved to the intermediate state.";
pub const STATE_FINISHED_TEXT: &str = "All done. Thanks for using the bot!";

/// The state-selection keyboard shown on `/start`: one button per
/// reachable state, one row each.
pub fn state_keyboard() -> InlineKeyboard {
    InlineKeyboard::new()
        .row([("Start", "start")])
        .row([("Middle", "middle")])
        .row([("Finish", "finish")])
}

// Greeting menu (/greet)

pub const GREET_PROMPT: &str = "Pick an option:";
pub const GREET_HELLO_TEXT: &str = "Hi there!";
pub const GREET_BYE_TEXT: &str = "See you later!";

/// The two-button greeting keyboard shown on `/greet`.
pub fn greeting_keyboard() -> InlineKeyboard {
    InlineKeyboard::new().row([("Greeting", "hello"), ("Farewell", "bye")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_keyboard_covers_all_conversation_tokens() {
        let kb = state_keyboard();
        for token in ["start", "middle", "finish"] {
            assert!(kb.button_for_token(token).is_some(), "missing {token}");
        }
    }

    #[test]
    fn greeting_keyboard_is_one_row() {
        let kb = greeting_keyboard();
        assert_eq!(kb.rows.len(), 1);
        assert!(kb.button_for_token("hello").is_some());
        assert!(kb.button_for_token("bye").is_some());
    }
}
