//! Dispatcher for chat sessions
//!
//! Owns one `SessionRuntime` per live chat, routes inbound updates to the
//! right one, and publishes observer events for frontends and tests.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::{InMemoryStateStore, StateStore, Transport, TransportError};

use crate::keyboard::InlineKeyboard;
use crate::state_machine::{BotCommand, ButtonAction, ChatContext, ChatState, Event};
use crate::update::{ChatId, MessageId, Update, UpdateKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Channel capacities for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Capacity of each per-chat event queue
    pub event_capacity: usize,
    /// Capacity of the observer broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            event_capacity: 32,
            broadcast_capacity: 128,
        }
    }
}

impl DispatcherConfig {
    /// Read overrides from `MICROBOT_EVENT_CAPACITY` and
    /// `MICROBOT_BROADCAST_CAPACITY`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            event_capacity: std::env::var("MICROBOT_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.event_capacity),
            broadcast_capacity: std::env::var("MICROBOT_BROADCAST_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.broadcast_capacity),
        }
    }
}

/// Events published to observers. Every event carries its chat id, so a
/// single manager-wide channel serves all sessions.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageSent {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboard>,
        sent_at: DateTime<Utc>,
    },
    MessageEdited {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    },
    StateChanged {
        chat_id: ChatId,
        state: ChatState,
    },
    SessionEnded {
        chat_id: ChatId,
    },
    Error {
        chat_id: ChatId,
        message: String,
    },
}

/// Handle to interact with a running session
struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
}

/// Manager for all chat session runtimes
pub struct SessionManager<S, T> {
    store: S,
    transport: Arc<T>,
    config: DispatcherConfig,
    sessions: RwLock<HashMap<ChatId, SessionHandle>>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl<S, T> SessionManager<S, T>
where
    S: StateStore + Clone + 'static,
    T: Transport + 'static,
{
    pub fn new(store: S, transport: Arc<T>, config: DispatcherConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_capacity);
        Self {
            store,
            transport,
            config,
            sessions: RwLock::new(HashMap::new()),
            broadcast_tx,
        }
    }

    /// Subscribe to observer events for all sessions
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Number of live sessions
    #[allow(dead_code)] // State query utility
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Route an inbound update to the owning session.
    ///
    /// Commands are entry points and may create a session; callback
    /// queries only ever reach an existing one. A press arriving for a
    /// chat with no live session is dropped, exactly like a press on a
    /// keyboard whose conversation has already ended.
    pub async fn dispatch(self: &Arc<Self>, update: Update) -> Result<(), String> {
        let chat_id = update.chat_id;
        match update.kind {
            UpdateKind::Command { name } => {
                let command = BotCommand::from_name(&name);
                tracing::debug!(%chat_id, command = command.name(), "forwarding command");
                let event = Event::Command { command };
                let event_tx = self.get_or_create(chat_id).await?;
                event_tx
                    .send(event)
                    .await
                    .map_err(|e| format!("Failed to send event: {e}"))
            }
            UpdateKind::CallbackQuery {
                query_id,
                message_id,
                token,
            } => {
                let event_tx = {
                    let sessions = self.sessions.read().await;
                    sessions.get(&chat_id).map(|h| h.event_tx.clone())
                };
                let Some(event_tx) = event_tx else {
                    tracing::debug!(%chat_id, %token, "dropping press for chat with no session");
                    return Ok(());
                };
                let action = ButtonAction::from_token(&token);
                tracing::debug!(%chat_id, token = action.token(), "forwarding button press");
                let event = Event::ButtonPress {
                    query_id,
                    message_id,
                    action,
                };
                event_tx
                    .send(event)
                    .await
                    .map_err(|e| format!("Failed to send event: {e}"))
            }
        }
    }

    /// Send an event directly to a session, creating it if needed
    #[allow(dead_code)] // API completeness
    pub async fn send_event(self: &Arc<Self>, chat_id: ChatId, event: Event) -> Result<(), String> {
        let event_tx = self.get_or_create(chat_id).await?;
        event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    /// Get the event sender for a chat, spawning its runtime if it has
    /// none yet
    async fn get_or_create(self: &Arc<Self>, chat_id: ChatId) -> Result<mpsc::Sender<Event>, String> {
        let mut sessions = self.sessions.write().await;
        if let Some(handle) = sessions.get(&chat_id) {
            return Ok(handle.event_tx.clone());
        }

        // Resume from the stored state when one exists (a handle can be
        // dropped while the store still remembers the chat)
        let initial_state = self.store.get_state(chat_id).await?.unwrap_or_default();

        let (event_tx, event_rx) = mpsc::channel(self.config.event_capacity);
        let context = ChatContext::new(chat_id);

        let runtime = SessionRuntime::new(
            context,
            initial_state,
            self.store.clone(),
            Arc::clone(&self.transport),
            event_rx,
            self.broadcast_tx.clone(),
        );

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            runtime.run().await;
            manager.remove_session(chat_id).await;
            tracing::info!(%chat_id, "session runtime finished");
        });

        sessions.insert(
            chat_id,
            SessionHandle {
                event_tx: event_tx.clone(),
            },
        );

        Ok(event_tx)
    }

    async fn remove_session(&self, chat_id: ChatId) {
        self.sessions.write().await.remove(&chat_id);
    }
}
