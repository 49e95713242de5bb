//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::update::{ChatId, MessageId};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ChatContext {
    ChatContext::new(ChatId(42))
}

const KNOWN_TOKENS: [&str; 5] = ["start", "middle", "finish", "hello", "bye"];

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::Start),
        Just(ChatState::Intermediate),
        Just(ChatState::Finished),
    ]
}

fn arb_live_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![Just(ChatState::Start), Just(ChatState::Intermediate)]
}

fn arb_conversation_action() -> impl Strategy<Value = ButtonAction> {
    prop_oneof![
        Just(ButtonAction::Start),
        Just(ButtonAction::Middle),
        Just(ButtonAction::Finish),
    ]
}

fn arb_action() -> impl Strategy<Value = ButtonAction> {
    prop_oneof![
        arb_conversation_action(),
        Just(ButtonAction::Hello),
        Just(ButtonAction::Bye),
        "[a-z0-9_-]{1,16}".prop_map(|token| ButtonAction::from_token(&token)),
    ]
}

fn arb_unknown_token() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,16}".prop_filter("must not collide with a known token", |t| {
        !KNOWN_TOKENS.contains(&t.as_str())
    })
}

fn arb_press() -> impl Strategy<Value = Event> {
    ("[a-f0-9]{8}", 1i64..1000, arb_action()).prop_map(|(query_id, message_id, action)| {
        Event::ButtonPress {
            query_id,
            message_id: MessageId(message_id),
            action,
        }
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_press(),
        Just(Event::Command {
            command: BotCommand::Start
        }),
        Just(Event::Command {
            command: BotCommand::Greet
        }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Transitions are deterministic: the same state and event always
    /// produce the same result.
    #[test]
    fn transition_is_deterministic(state in arb_state(), event in arb_event()) {
        let a = transition(&state, &test_context(), event.clone()).unwrap();
        let b = transition(&state, &test_context(), event).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Unrecognized tokens never change state and never produce effects.
    #[test]
    fn unknown_tokens_are_inert(
        state in arb_state(),
        query_id in "[a-f0-9]{8}",
        message_id in 1i64..1000,
        token in arb_unknown_token(),
    ) {
        let event = Event::ButtonPress {
            query_id,
            message_id: MessageId(message_id),
            action: ButtonAction::from_token(&token),
        };
        let result = transition(&state, &test_context(), event).unwrap();

        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    /// Finished absorbs conversation tokens: no transition out, nothing
    /// sent.
    #[test]
    fn finished_has_no_outbound_transitions(
        query_id in "[a-f0-9]{8}",
        message_id in 1i64..1000,
        action in arb_conversation_action(),
    ) {
        let event = Event::ButtonPress {
            query_id,
            message_id: MessageId(message_id),
            action,
        };
        let result = transition(&ChatState::Finished, &test_context(), event).unwrap();

        prop_assert_eq!(result.new_state, ChatState::Finished);
        prop_assert!(result.effects.is_empty());
    }

    /// Each conversation token maps to exactly one target state from any
    /// live state, acknowledging the press before editing the prompt.
    #[test]
    fn conversation_tokens_have_one_target(
        state in arb_live_state(),
        query_id in "[a-f0-9]{8}",
        message_id in 1i64..1000,
        action in arb_conversation_action(),
    ) {
        let expected = match action {
            ButtonAction::Start => ChatState::Start,
            ButtonAction::Middle => ChatState::Intermediate,
            ButtonAction::Finish => ChatState::Finished,
            _ => unreachable!(),
        };

        let event = Event::ButtonPress {
            query_id: query_id.clone(),
            message_id: MessageId(message_id),
            action,
        };
        let result = transition(&state, &test_context(), event).unwrap();

        prop_assert_eq!(&result.new_state, &expected);
        prop_assert_eq!(&result.effects[0], &Effect::ack(query_id));
        prop_assert!(
            matches!(result.effects[1], Effect::EditMessage { .. }),
            "effects[1] should be EditMessage"
        );
        prop_assert!(result.effects.contains(&Effect::PublishState));
        prop_assert_eq!(
            result.effects.contains(&Effect::EndSession),
            expected == ChatState::Finished
        );
    }

    /// `/start` is a universal entry point: every state lands in Start
    /// with the state-selection keyboard on screen.
    #[test]
    fn start_command_always_enters_start(state in arb_state()) {
        let event = Event::Command { command: BotCommand::Start };
        let result = transition(&state, &test_context(), event).unwrap();

        prop_assert_eq!(result.new_state, ChatState::Start);
        prop_assert!(
            matches!(
                &result.effects[0],
                Effect::SendPrompt { keyboard, .. } if keyboard.button_for_token("finish").is_some()
            ),
            "effects[0] should be SendPrompt with a finish button"
        );
    }

    /// Greeting presses leave the conversation state alone in every state.
    #[test]
    fn greeting_presses_never_change_state(
        state in arb_state(),
        query_id in "[a-f0-9]{8}",
        message_id in 1i64..1000,
        hello in any::<bool>(),
    ) {
        let action = if hello { ButtonAction::Hello } else { ButtonAction::Bye };
        let event = Event::ButtonPress {
            query_id,
            message_id: MessageId(message_id),
            action,
        };
        let result = transition(&state, &test_context(), event).unwrap();

        prop_assert_eq!(result.new_state, state);
        prop_assert!(!result.effects.contains(&Effect::PublishState));
        prop_assert!(!result.effects.contains(&Effect::EndSession));
    }
}
