//! Inline keyboards
//!
//! A keyboard is rows of labeled buttons, each carrying an opaque token
//! that comes back in a callback query when the button is pressed.

use serde::{Deserialize, Serialize};

/// One button: a visible label plus the token sent back on press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub token: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// An inline keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row of buttons, given as `(label, token)` pairs.
    pub fn row<L, T>(mut self, buttons: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        self.rows.push(
            buttons
                .into_iter()
                .map(|(label, token)| InlineButton::new(label, token))
                .collect(),
        );
        self
    }

    /// Iterate all buttons in layout order.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }

    /// Look up a button by its token.
    pub fn button_for_token(&self, token: &str) -> Option<&InlineButton> {
        self.buttons().find(|b| b.token == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_layout() {
        let kb = InlineKeyboard::new()
            .row([("A", "a")])
            .row([("B", "b"), ("C", "c")]);

        assert_eq!(kb.rows.len(), 2);
        assert_eq!(kb.rows[1].len(), 2);
        assert_eq!(kb.buttons().count(), 3);
    }

    #[test]
    fn lookup_by_token() {
        let kb = InlineKeyboard::new().row([("Start", "start"), ("Finish", "finish")]);

        assert_eq!(kb.button_for_token("finish").unwrap().label, "Finish");
        assert!(kb.button_for_token("nope").is_none());
    }
}
