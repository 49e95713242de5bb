//! Trait abstractions for dispatcher I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::keyboard::InlineKeyboard;
use crate::state_machine::ChatState;
use crate::update::{ChatId, MessageId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Storage for per-chat conversation state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Store the current state for a chat
    async fn update_state(&self, chat_id: ChatId, state: &ChatState) -> Result<(), String>;

    /// Get the current state for a chat, `None` if it has none
    async fn get_state(&self, chat_id: ChatId) -> Result<Option<ChatState>, String>;

    /// Forget a chat's state
    async fn remove_state(&self, chat_id: ChatId) -> Result<(), String>;
}

/// Errors a transport can produce
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("chat {0} not reachable")]
    Unreachable(ChatId),
}

/// Outbound side of a chat connection
///
/// This is the whole of the bot's dependency on a chat platform; the
/// shipped binary implements it on top of the console.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message, optionally carrying an inline keyboard. Returns
    /// the id the transport assigned to the message.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageId, TransportError>;

    /// Edit an earlier message in place
    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError>;

    /// Acknowledge a button press
    async fn ack_button(&self, query_id: &str) -> Result<(), TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn update_state(&self, chat_id: ChatId, state: &ChatState) -> Result<(), String> {
        (**self).update_state(chat_id, state).await
    }

    async fn get_state(&self, chat_id: ChatId) -> Result<Option<ChatState>, String> {
        (**self).get_state(chat_id).await
    }

    async fn remove_state(&self, chat_id: ChatId) -> Result<(), String> {
        (**self).remove_state(chat_id).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageId, TransportError> {
        (**self).send_message(chat_id, text, keyboard).await
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        (**self).edit_message(chat_id, message_id, text).await
    }

    async fn ack_button(&self, query_id: &str) -> Result<(), TransportError> {
        (**self).ack_button(query_id).await
    }
}

// ============================================================================
// Production Store
// ============================================================================

/// In-memory state store
///
/// The only production implementation: conversation state deliberately
/// does not survive a restart.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    states: Arc<Mutex<HashMap<ChatId, ChatState>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored states
    #[allow(dead_code)] // Useful for tests
    pub fn snapshot(&self) -> HashMap<ChatId, ChatState> {
        self.states.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn update_state(&self, chat_id: ChatId, state: &ChatState) -> Result<(), String> {
        self.states.lock().unwrap().insert(chat_id, state.clone());
        Ok(())
    }

    async fn get_state(&self, chat_id: ChatId) -> Result<Option<ChatState>, String> {
        Ok(self.states.lock().unwrap().get(&chat_id).cloned())
    }

    async fn remove_state(&self, chat_id: ChatId) -> Result<(), String> {
        self.states.lock().unwrap().remove(&chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_round_trip() {
        let store = InMemoryStateStore::new();
        let chat = ChatId(5);

        assert!(store.get_state(chat).await.unwrap().is_none());

        store
            .update_state(chat, &ChatState::Intermediate)
            .await
            .unwrap();
        assert_eq!(
            store.get_state(chat).await.unwrap(),
            Some(ChatState::Intermediate)
        );

        store.remove_state(chat).await.unwrap();
        assert!(store.get_state(chat).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_map() {
        let store = InMemoryStateStore::new();
        let clone = store.clone();

        clone.update_state(ChatId(1), &ChatState::Start).await.unwrap();
        assert_eq!(store.snapshot().len(), 1);
    }
}
