//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::{Transport, TransportError};
use crate::keyboard::InlineKeyboard;
use crate::update::{ChatId, MessageId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

/// A message recorded by [`RecordingTransport::send_message`]
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

/// An edit recorded by [`RecordingTransport::edit_message`]
#[derive(Debug, Clone)]
pub struct EditedMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
}

/// Transport that records every call and mints sequential message ids
#[derive(Default)]
pub struct RecordingTransport {
    next_message_id: AtomicI64,
    sent: Mutex<Vec<SentMessage>>,
    edited: Mutex<Vec<EditedMessage>>,
    acked: Mutex<Vec<String>>,
    fail_next_send: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Make the next `send_message` call fail
    pub fn fail_next_send(&self) {
        self.fail_next_send.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<EditedMessage> {
        self.edited.lock().unwrap().clone()
    }

    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageId, TransportError> {
        if self.fail_next_send.swap(false, Ordering::SeqCst) {
            return Err(TransportError::Unreachable(chat_id));
        }
        let message_id = MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        self.edited.lock().unwrap().push(EditedMessage {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn ack_button(&self, query_id: &str) -> Result<(), TransportError> {
        self.acked.lock().unwrap().push(query_id.to_string());
        Ok(())
    }
}
