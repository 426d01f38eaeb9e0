//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn identified_state() -> AppState {
    let registering = transition(
        &AppState::default(),
        Event::IdentitySubmitted {
            email: "ada@example.org".to_string(),
            username: "ada".to_string(),
        },
    )
    .unwrap()
    .new_state;
    transition(
        &registering,
        Event::IdentityRegistered {
            user_id: "user-1".to_string(),
        },
    )
    .unwrap()
    .new_state
}

/// Apply events, skipping rejected ones
fn run(events: Vec<Event>) -> AppState {
    let mut state = identified_state();
    for event in events {
        if let Ok(result) = transition(&state, event) {
            state = result.new_state;
        }
    }
    state
}

fn message_log(state: &AppState, session_id: &str) -> Option<Vec<Message>> {
    state.directory.get(session_id).map(|s| s.messages.clone())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_session_id() -> impl Strategy<Value = String> {
    "s[1-4]".prop_map(String::from)
}

fn arb_session() -> impl Strategy<Value = Session> {
    (arb_session_id(), "[a-z]{1,8}").prop_map(|(id, name)| Session::new(id, name))
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant), Just(Role::System)]
}

fn arb_message() -> impl Strategy<Value = Message> {
    ("[a-z0-9]{6}", arb_role(), "[a-zA-Z ]{0,20}")
        .prop_map(|(id, role, content)| Message::new(id, role, content))
}

fn arb_source() -> impl Strategy<Value = Source> {
    ("[a-zA-Z ]{0,10}", "https://[a-z]{3,8}\\.org").prop_map(|(title, url)| Source::new(title, url))
}

fn arb_reply_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (
            arb_session_id(),
            "[a-zA-Z ]{0,20}",
            proptest::collection::vec(arb_source(), 0..3)
        )
            .prop_map(|(session_id, answer, sources)| Event::ReplyReceived {
                session_id,
                message_id: uuid::Uuid::new_v4().to_string(),
                answer,
                sources,
            }),
        arb_session_id().prop_map(|session_id| Event::ReplyFailed {
            session_id,
            message_id: uuid::Uuid::new_v4().to_string(),
            message: "connection refused".to_string(),
        }),
    ]
}

fn arb_directory_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::collection::vec(arb_session(), 0..4)
            .prop_map(|sessions| Event::SessionsListed { sessions }),
        Just(Event::SessionsListFailed {
            message: "HTTP 500".to_string()
        }),
        Just(Event::CreateSessionRequested),
        arb_session().prop_map(|session| Event::SessionCreated { session }),
        arb_session_id().prop_map(|session_id| Event::DeleteSessionRequested { session_id }),
        arb_session_id().prop_map(|session_id| Event::SessionDeleted { session_id }),
        arb_session_id().prop_map(Event::select),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_directory_event(),
        (arb_session_id(), proptest::collection::vec(arb_message(), 0..3))
            .prop_map(|(session_id, messages)| Event::HistoryLoaded {
                session_id,
                messages
            }),
        arb_session_id().prop_map(|session_id| Event::HistoryFailed {
            session_id,
            message: "HTTP 404".to_string(),
        }),
        "[a-zA-Z ]{0,12}".prop_map(Event::send),
        arb_reply_event(),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: the active session is always a member of the directory
    #[test]
    fn prop_active_session_is_member(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = identified_state();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
                if let Some(active) = state.directory.active_id() {
                    prop_assert!(
                        state.directory.contains(active),
                        "Active {} missing from {:?}",
                        active,
                        state.directory
                    );
                }
            }
        }
    }

    // Invariant 2: replies only ever touch the session they were sent for
    #[test]
    fn prop_replies_never_misfile(
        history in proptest::collection::vec(arb_event(), 0..20),
        reply in arb_reply_event()
    ) {
        let before = run(history);
        let target = match &reply {
            Event::ReplyReceived { session_id, .. } | Event::ReplyFailed { session_id, .. } => {
                session_id.clone()
            }
            _ => unreachable!(),
        };
        let after = transition(&before, reply).unwrap().new_state;

        prop_assert!(!after.pending);
        prop_assert_eq!(after.directory.active_id(), before.directory.active_id());
        for session in before.directory.sessions() {
            let new_log = message_log(&after, &session.id).unwrap();
            if session.id == target {
                prop_assert_eq!(new_log.len(), session.messages.len() + 1);
                prop_assert_eq!(&new_log[..session.messages.len()], &session.messages[..]);
                prop_assert_eq!(new_log.last().map(|m| m.role), Some(Role::Assistant));
            } else {
                prop_assert_eq!(&new_log, &session.messages);
            }
        }
    }

    // Invariant 3: only one exchange may be pending at a time
    #[test]
    fn prop_send_while_pending_rejected(
        history in proptest::collection::vec(arb_event(), 0..20),
        text in "[a-zA-Z]{1,12}"
    ) {
        let mut state = run(history);
        state.pending = true;
        let result = transition(&state, Event::send(text));
        prop_assert!(matches!(result, Err(TransitionError::ExchangePending)));
    }

    // Invariant 4: outside of hydration, message logs only grow at the end
    #[test]
    fn prop_logs_are_append_only(
        history in proptest::collection::vec(arb_event(), 0..20),
        event in arb_event()
    ) {
        prop_assume!(!matches!(
            event,
            Event::HistoryLoaded { .. }
                | Event::SessionsListed { .. }
                | Event::SessionsListFailed { .. }
                | Event::SessionCreated { .. }
        ));
        let before = run(history);
        if let Ok(result) = transition(&before, event) {
            for session in before.directory.sessions() {
                if let Some(new_log) = message_log(&result.new_state, &session.id) {
                    prop_assert!(new_log.len() >= session.messages.len());
                    prop_assert_eq!(&new_log[..session.messages.len()], &session.messages[..]);
                }
            }
        }
    }

    // Invariant 5: an accepted send targets the active session and nothing else
    #[test]
    fn prop_send_targets_active_session(
        history in proptest::collection::vec(arb_event(), 0..20),
        text in "[a-zA-Z]{1,12}"
    ) {
        let mut state = run(history);
        state.pending = false;
        let active = state.directory.active_id().map(ToString::to_string);
        match transition(&state, Event::send(text.clone())) {
            Ok(result) => {
                let active = active.unwrap();
                prop_assert!(result.new_state.pending);
                prop_assert!(result.new_state.sources.is_empty());
                prop_assert_eq!(
                    result.effects,
                    vec![Effect::SendChat {
                        user_id: "user-1".to_string(),
                        session_id: active.clone(),
                        query: text.clone(),
                    }]
                );
                let last = result
                    .new_state
                    .directory
                    .get(&active)
                    .and_then(|s| s.messages.last().cloned())
                    .unwrap();
                prop_assert_eq!(last.role, Role::User);
                prop_assert_eq!(last.content, text);
            }
            Err(e) => {
                prop_assert!(active.is_none());
                prop_assert_eq!(e, TransitionError::NoActiveSession);
            }
        }
    }
}
