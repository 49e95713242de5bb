//! Console frontend
//!
//! Drives the dispatcher from stdin/stdout so the flows can be exercised
//! without any chat platform. Commands are typed as `/start`; a button
//! press is simulated by typing the token printed next to its label.

use crate::dispatcher::{SessionEvent, SessionManager, StateStore, Transport, TransportError};
use crate::keyboard::InlineKeyboard;
use crate::update::{ChatId, MessageId, Update, UpdateKind};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// The single chat a console session talks in
const CONSOLE_CHAT: ChatId = ChatId(1);

/// Transport that renders bot output to stdout
///
/// Remembers, per chat, which message currently carries a keyboard so
/// the input loop knows what a bare token refers to.
#[derive(Default)]
pub struct ConsoleTransport {
    next_message_id: AtomicI64,
    keyboards: Mutex<HashMap<ChatId, (MessageId, InlineKeyboard)>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// The message whose keyboard a bare token would press
    pub fn keyboard_message(&self, chat_id: ChatId) -> Option<MessageId> {
        self.keyboards.lock().unwrap().get(&chat_id).map(|(id, _)| *id)
    }

    /// Label of the button carrying `token` on the current keyboard
    pub fn button_label(&self, chat_id: ChatId, token: &str) -> Option<String> {
        let keyboards = self.keyboards.lock().unwrap();
        let (_, keyboard) = keyboards.get(&chat_id)?;
        keyboard.button_for_token(token).map(|b| b.label.clone())
    }

    fn render_keyboard(keyboard: &InlineKeyboard) {
        for row in &keyboard.rows {
            let rendered: Vec<String> = row
                .iter()
                .map(|b| format!("[ {} ({}) ]", b.label, b.token))
                .collect();
            println!("      {}", rendered.join("  "));
        }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageId, TransportError> {
        let message_id = MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        println!("[bot] {text}");
        if let Some(keyboard) = keyboard {
            Self::render_keyboard(keyboard);
            self.keyboards
                .lock()
                .unwrap()
                .insert(chat_id, (message_id, keyboard.clone()));
        }
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        _chat_id: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        println!("[bot] (edit {message_id}) {text}");
        Ok(())
    }

    async fn ack_button(&self, _query_id: &str) -> Result<(), TransportError> {
        // The console has no button spinner to dismiss
        Ok(())
    }
}

/// Print observer events that matter at the console
fn spawn_observer<S, T>(manager: &Arc<SessionManager<S, T>>)
where
    S: StateStore + Clone + 'static,
    T: Transport + 'static,
{
    let mut events = BroadcastStream::new(manager.subscribe());
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(SessionEvent::StateChanged { state, .. }) => {
                    println!("      · state: {state}");
                }
                Ok(SessionEvent::SessionEnded { .. }) => {
                    println!("      · conversation over, /start begins a new one");
                }
                Ok(SessionEvent::Error { message, .. }) => {
                    println!("      ! {message}");
                }
                Ok(other) => {
                    let payload = serde_json::to_string(&other).unwrap_or_default();
                    tracing::debug!(%payload, "session event");
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "console observer lagged behind");
                }
            }
        }
    });
}

/// Run the interactive console loop until `/quit`, EOF, or Ctrl+C.
pub async fn run<S>(
    manager: Arc<SessionManager<S, ConsoleTransport>>,
    transport: Arc<ConsoleTransport>,
) -> io::Result<()>
where
    S: StateStore + Clone + 'static,
{
    println!("microbot console. /start begins a conversation, /greet shows the menu, /quit exits.");

    spawn_observer(&manager);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("\nyou> ");
        io::stdout().flush()?;

        // Read the next line, interruptible by Ctrl+C
        let line = tokio::select! {
            result = lines.next_line() => {
                match result {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        // Ctrl+D (EOF)
                        println!();
                        break;
                    }
                    Err(e) => {
                        eprintln!("input error: {e}");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" || input == "/exit" {
            break;
        }

        match Update::parse_line(CONSOLE_CHAT, input, transport.keyboard_message(CONSOLE_CHAT)) {
            Some(update) => {
                if let UpdateKind::CallbackQuery { token, .. } = &update.kind {
                    if let Some(label) = transport.button_label(CONSOLE_CHAT, token) {
                        println!("      · pressing \"{label}\"");
                    }
                }
                if let Err(e) = manager.dispatch(update).await {
                    eprintln!("error: {e}");
                }
            }
            None => {
                println!("      · nothing to press yet, /start puts a keyboard on screen");
            }
        }

        // Give the session loop a beat to render before the next prompt
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyboard_message_tracks_latest_keyboard() {
        let transport = ConsoleTransport::new();
        let kb = InlineKeyboard::new().row([("A", "a")]);

        assert!(transport.keyboard_message(CONSOLE_CHAT).is_none());

        let first = transport
            .send_message(CONSOLE_CHAT, "one", Some(&kb))
            .await
            .unwrap();
        assert_eq!(transport.keyboard_message(CONSOLE_CHAT), Some(first));

        // A plain message does not steal the keyboard
        transport
            .send_message(CONSOLE_CHAT, "two", None)
            .await
            .unwrap();
        assert_eq!(transport.keyboard_message(CONSOLE_CHAT), Some(first));

        let third = transport
            .send_message(CONSOLE_CHAT, "three", Some(&kb))
            .await
            .unwrap();
        assert_eq!(transport.keyboard_message(CONSOLE_CHAT), Some(third));
    }

    #[tokio::test]
    async fn button_label_resolves_against_current_keyboard() {
        let transport = ConsoleTransport::new();
        let kb = InlineKeyboard::new().row([("Finish", "finish")]);

        transport
            .send_message(CONSOLE_CHAT, "prompt", Some(&kb))
            .await
            .unwrap();

        assert_eq!(
            transport.button_label(CONSOLE_CHAT, "finish"),
            Some("Finish".to_string())
        );
        assert!(transport.button_label(CONSOLE_CHAT, "mystery").is_none());
        assert!(transport.button_label(ChatId(99), "finish").is_none());
    }
}
