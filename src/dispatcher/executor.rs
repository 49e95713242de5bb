//! Session runtime executor
//!
//! One runtime per live chat. Events are handled strictly one at a time:
//! the pure transition runs, the state is swapped, and the resulting
//! effects execute in order before the next event is taken off the
//! queue. All state mutation happens on this single path.

use super::traits::{StateStore, Transport};
use super::SessionEvent;
use crate::state_machine::{transition, ChatContext, ChatState, Effect, Event};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Generic session runtime that can work with any store and transport
pub struct SessionRuntime<S, T>
where
    S: StateStore + Clone + 'static,
    T: Transport + 'static,
{
    context: ChatContext,
    state: ChatState,
    store: S,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    /// Set by `Effect::EndSession`; the loop exits after the current
    /// event's remaining effects have run
    ending: bool,
}

impl<S, T> SessionRuntime<S, T>
where
    S: StateStore + Clone + 'static,
    T: Transport + 'static,
{
    pub fn new(
        context: ChatContext,
        state: ChatState,
        store: S,
        transport: Arc<T>,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            context,
            state,
            store,
            transport,
            event_rx,
            broadcast_tx,
            ending: false,
        }
    }

    pub async fn run(mut self) {
        let chat_id = self.context.chat_id;
        tracing::info!(%chat_id, state = %self.state, "starting session runtime");

        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.process_event(event).await {
                tracing::error!(%chat_id, error = %e, "error handling event");
                let _ = self.broadcast_tx.send(SessionEvent::Error {
                    chat_id,
                    message: e,
                });
            }
            if self.ending {
                break;
            }
        }

        // The chat is forgotten entirely: a later /start begins from
        // scratch
        if let Err(e) = self.store.remove_state(chat_id).await {
            tracing::warn!(%chat_id, error = %e, "failed to clear stored state");
        }
        let _ = self.broadcast_tx.send(SessionEvent::SessionEnded { chat_id });

        let uptime = Utc::now() - self.context.started_at;
        tracing::info!(
            %chat_id,
            uptime_ms = uptime.num_milliseconds(),
            "session runtime stopped"
        );
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        // Pure state transition
        let result =
            transition(&self.state, &self.context, event).map_err(|e| e.to_string())?;

        let old_state = std::mem::replace(&mut self.state, result.new_state);
        if old_state != self.state {
            tracing::debug!(
                chat_id = %self.context.chat_id,
                from = %old_state,
                to = %self.state,
                "state changed"
            );
        }

        for effect in result.effects {
            self.execute_effect(effect).await?;
        }

        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<(), String> {
        let chat_id = self.context.chat_id;
        match effect {
            Effect::SendPrompt { text, keyboard } => {
                let message_id = self
                    .transport
                    .send_message(chat_id, &text, Some(&keyboard))
                    .await
                    .map_err(|e| e.to_string())?;
                let _ = self.broadcast_tx.send(SessionEvent::MessageSent {
                    chat_id,
                    message_id,
                    text,
                    keyboard: Some(keyboard),
                    sent_at: Utc::now(),
                });
            }

            Effect::EditMessage { message_id, text } => {
                self.transport
                    .edit_message(chat_id, message_id, &text)
                    .await
                    .map_err(|e| e.to_string())?;
                let _ = self.broadcast_tx.send(SessionEvent::MessageEdited {
                    chat_id,
                    message_id,
                    text,
                });
            }

            Effect::AckButton { query_id } => {
                self.transport
                    .ack_button(&query_id)
                    .await
                    .map_err(|e| e.to_string())?;
            }

            Effect::PublishState => {
                self.store.update_state(chat_id, &self.state).await?;
                let _ = self.broadcast_tx.send(SessionEvent::StateChanged {
                    chat_id,
                    state: self.state.clone(),
                });
            }

            Effect::EndSession => {
                tracing::info!(%chat_id, "conversation finished, ending session");
                self.ending = true;
            }
        }
        Ok(())
    }
}
