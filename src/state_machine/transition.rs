//! Pure state transition function

use super::{BotCommand, ButtonAction, ChatContext, ChatState, Effect, Event};
use crate::flows;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// A press that leads nowhere: state untouched, nothing sent.
    fn ignored(state: ChatState) -> Self {
        Self::new(state)
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("unknown command: /{0}")]
    UnknownCommand(String),
}

/// Pure transition function
///
/// Given the same inputs, it always produces the same outputs, with no
/// I/O side effects. Effect order is fixed: acknowledge the press, edit
/// the prompt, then publish the new state.
pub fn transition(
    state: &ChatState,
    _context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Entry points: commands work from every state
        // ============================================================

        // /start (re)enters the conversation flow, Finished included
        (
            _,
            Event::Command {
                command: BotCommand::Start,
            },
        ) => Ok(TransitionResult::new(ChatState::Start)
            .with_effect(Effect::send_prompt(
                flows::STATE_PROMPT,
                flows::state_keyboard(),
            ))
            .with_effect(Effect::PublishState)),

        // /greet shows the greeting menu without touching the state
        (
            state,
            Event::Command {
                command: BotCommand::Greet,
            },
        ) => Ok(
            TransitionResult::new(state.clone()).with_effect(Effect::send_prompt(
                flows::GREET_PROMPT,
                flows::greeting_keyboard(),
            )),
        ),

        (
            _,
            Event::Command {
                command: BotCommand::Unknown { name },
            },
        ) => Err(TransitionError::UnknownCommand(name)),

        // ============================================================
        // Greeting menu: stateless button presses
        // ============================================================
        (
            state,
            Event::ButtonPress {
                query_id,
                message_id,
                action: ButtonAction::Hello,
            },
        ) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::ack(query_id))
            .with_effect(Effect::edit(message_id, flows::GREET_HELLO_TEXT))),

        (
            state,
            Event::ButtonPress {
                query_id,
                message_id,
                action: ButtonAction::Bye,
            },
        ) => Ok(TransitionResult::new(state.clone())
            .with_effect(Effect::ack(query_id))
            .with_effect(Effect::edit(message_id, flows::GREET_BYE_TEXT))),

        // ============================================================
        // Terminal state absorbs every remaining press
        // ============================================================
        (state, Event::ButtonPress { .. }) if state.is_terminal() => {
            Ok(TransitionResult::ignored(state.clone()))
        }

        // ============================================================
        // Conversation flow: each token maps to exactly one state
        // ============================================================
        (
            _,
            Event::ButtonPress {
                query_id,
                message_id,
                action: ButtonAction::Start,
            },
        ) => Ok(TransitionResult::new(ChatState::Start)
            .with_effect(Effect::ack(query_id))
            .with_effect(Effect::edit(message_id, flows::STATE_START_TEXT))
            .with_effect(Effect::PublishState)),

        (
            _,
            Event::ButtonPress {
                query_id,
                message_id,
                action: ButtonAction::Middle,
            },
        ) => Ok(TransitionResult::new(ChatState::Intermediate)
            .with_effect(Effect::ack(query_id))
            .with_effect(Effect::edit(message_id, flows::STATE_INTERMEDIATE_TEXT))
            .with_effect(Effect::PublishState)),

        (
            _,
            Event::ButtonPress {
                query_id,
                message_id,
                action: ButtonAction::Finish,
            },
        ) => Ok(TransitionResult::new(ChatState::Finished)
            .with_effect(Effect::ack(query_id))
            .with_effect(Effect::edit(message_id, flows::STATE_FINISHED_TEXT))
            .with_effect(Effect::PublishState)
            .with_effect(Effect::EndSession)),

        // ============================================================
        // Unrecognized tokens: silently ignored, no transition
        // ============================================================
        (
            state,
            Event::ButtonPress {
                action: ButtonAction::Unknown { .. },
                ..
            },
        ) => Ok(TransitionResult::ignored(state.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::{ChatId, MessageId};

    fn test_context() -> ChatContext {
        ChatContext::new(ChatId(42))
    }

    fn press(action: ButtonAction) -> Event {
        Event::ButtonPress {
            query_id: "q-1".to_string(),
            message_id: MessageId(10),
            action,
        }
    }

    fn command(command: BotCommand) -> Event {
        Event::Command { command }
    }

    #[test]
    fn start_command_shows_state_keyboard() {
        let result = transition(
            &ChatState::Intermediate,
            &test_context(),
            command(BotCommand::Start),
        )
        .unwrap();

        assert_eq!(result.new_state, ChatState::Start);
        match &result.effects[0] {
            Effect::SendPrompt { text, keyboard } => {
                assert_eq!(text, flows::STATE_PROMPT);
                assert!(keyboard.button_for_token("middle").is_some());
            }
            other => panic!("expected SendPrompt, got {other:?}"),
        }
        assert_eq!(result.effects[1], Effect::PublishState);
    }

    #[test]
    fn start_reenters_after_finish() {
        let result = transition(
            &ChatState::Finished,
            &test_context(),
            command(BotCommand::Start),
        )
        .unwrap();

        assert_eq!(result.new_state, ChatState::Start);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let result = transition(
            &ChatState::Start,
            &test_context(),
            command(BotCommand::Unknown {
                name: "help".to_string(),
            }),
        );

        assert!(matches!(result, Err(TransitionError::UnknownCommand(_))));
    }

    #[test]
    fn middle_token_moves_to_intermediate() {
        let result =
            transition(&ChatState::Start, &test_context(), press(ButtonAction::Middle)).unwrap();

        assert_eq!(result.new_state, ChatState::Intermediate);
        assert_eq!(
            result.effects,
            vec![
                Effect::ack("q-1"),
                Effect::edit(MessageId(10), flows::STATE_INTERMEDIATE_TEXT),
                Effect::PublishState,
            ]
        );
    }

    #[test]
    fn finish_token_ends_the_session() {
        let result = transition(
            &ChatState::Intermediate,
            &test_context(),
            press(ButtonAction::Finish),
        )
        .unwrap();

        assert_eq!(result.new_state, ChatState::Finished);
        assert_eq!(result.effects.last(), Some(&Effect::EndSession));
    }

    #[test]
    fn unknown_token_is_silently_ignored() {
        let result = transition(
            &ChatState::Intermediate,
            &test_context(),
            press(ButtonAction::Unknown {
                token: "mystery".to_string(),
            }),
        )
        .unwrap();

        assert_eq!(result.new_state, ChatState::Intermediate);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn finished_absorbs_conversation_tokens() {
        for action in [ButtonAction::Start, ButtonAction::Middle, ButtonAction::Finish] {
            let result =
                transition(&ChatState::Finished, &test_context(), press(action)).unwrap();

            assert_eq!(result.new_state, ChatState::Finished);
            assert!(result.effects.is_empty());
        }
    }

    #[test]
    fn greeting_buttons_do_not_change_state() {
        for state in [ChatState::Start, ChatState::Intermediate] {
            let result = transition(&state, &test_context(), press(ButtonAction::Hello)).unwrap();

            assert_eq!(result.new_state, state);
            assert_eq!(
                result.effects,
                vec![
                    Effect::ack("q-1"),
                    Effect::edit(MessageId(10), flows::GREET_HELLO_TEXT),
                ]
            );
        }
    }
}
