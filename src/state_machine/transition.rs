//! Pure state transition function
//!
//! Given the same state and event, `transition` always produces the same
//! new state and effects. All I/O is expressed as effects and executed by
//! the runtime.

use super::state::{Identity, Message, Session, User};
use super::{AppState, Effect, Event};
use thiserror::Error;

/// Content of the assistant message appended when an exchange fails
pub const EXCHANGE_FAILURE_TEXT: &str = "Error: Unable to get response.";

/// Alert shown when registration fails
pub const IDENTITY_FAILURE_TEXT: &str = "Failed to create or fetch user. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: AppState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: AppState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Guard rejections. A rejected event leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Email and username are both required")]
    MissingIdentityField,
    #[error("Identity is already established")]
    AlreadyIdentified,
    #[error("Registration already in progress")]
    RegistrationInFlight,
    #[error("No identity yet, submit email and username first")]
    NotIdentified,
    #[error("Unknown session: {0}")]
    UnknownSession(String),
    #[error("A reply is still pending")]
    ExchangePending,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("No active session")]
    NoActiveSession,
}

/// Pure transition function
pub fn transition(state: &AppState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Identity Bootstrap
        // ============================================================
        Event::IdentitySubmitted { email, username } => {
            match state.identity {
                Identity::Identified(_) => return Err(TransitionError::AlreadyIdentified),
                Identity::Registering => return Err(TransitionError::RegistrationInFlight),
                Identity::Unidentified => {}
            }
            let email = email.trim();
            let username = username.trim();
            if email.is_empty() || username.is_empty() {
                return Err(TransitionError::MissingIdentityField);
            }

            let mut next = state.clone();
            next.identity = Identity::Registering;
            next.identity_error = None;
            Ok(TransitionResult::new(next).with_effect(Effect::RegisterUser {
                email: email.to_string(),
                username: username.to_string(),
            }))
        }

        Event::IdentityRegistered { user_id } => {
            if state.identity.is_identified() {
                // No transition back out of Identified, and no second listing
                return Ok(TransitionResult::new(state.clone()));
            }
            let mut next = state.clone();
            next.identity = Identity::Identified(User {
                id: user_id.clone(),
            });
            next.identity_error = None;
            Ok(TransitionResult::new(next).with_effect(Effect::ListSessions { user_id }))
        }

        Event::IdentityFailed { .. } => {
            if state.identity.is_identified() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let mut next = state.clone();
            next.identity = Identity::Unidentified;
            next.identity_error = Some(IDENTITY_FAILURE_TEXT.to_string());
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Session Directory
        // ============================================================
        Event::SessionsListed { sessions } => {
            let mut next = state.clone();
            next.directory.replace_all(sessions);
            let hydrate = next.directory.active_id().map(Effect::fetch_history);
            Ok(TransitionResult::new(next).with_effects(hydrate))
        }

        // Soft-fail: degrade to an empty directory
        Event::SessionsListFailed { .. } => {
            let mut next = state.clone();
            next.directory.replace_all(Vec::new());
            Ok(TransitionResult::new(next))
        }

        Event::CreateSessionRequested => {
            let user_id = require_user(state)?;
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::CreateSession { user_id }))
        }

        // A fresh session is known to be empty, so no history fetch
        Event::SessionCreated { session } => {
            let mut next = state.clone();
            next.directory
                .insert_front(Session::new(session.id, session.name));
            Ok(TransitionResult::new(next))
        }

        Event::DeleteSessionRequested { session_id } => {
            require_user(state)?;
            if !state.directory.contains(&session_id) {
                return Err(TransitionError::UnknownSession(session_id));
            }
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::DeleteSession { session_id }))
        }

        Event::SessionDeleted { session_id } => {
            let mut next = state.clone();
            let was_active = next.directory.active_id() == Some(session_id.as_str());
            next.directory.remove(&session_id);
            // Reassignment moves the active id to a new value, which hydrates
            let hydrate = if was_active {
                next.directory.active_id().map(Effect::fetch_history)
            } else {
                None
            };
            Ok(TransitionResult::new(next).with_effects(hydrate))
        }

        // Soft-fail: directory left as it was
        Event::SessionCreateFailed { .. } | Event::SessionDeleteFailed { .. } => {
            Ok(TransitionResult::new(state.clone()))
        }

        Event::SessionSelected { session_id } => {
            require_user(state)?;
            let mut next = state.clone();
            if !next.directory.select(&session_id) {
                return Err(TransitionError::UnknownSession(session_id));
            }
            // Every selection re-fetches, including re-selecting the active one
            Ok(TransitionResult::new(next).with_effect(Effect::FetchHistory { session_id }))
        }

        // ============================================================
        // Conversation Buffer
        // ============================================================
        Event::HistoryLoaded {
            session_id,
            messages,
        } => {
            let mut next = state.clone();
            // Commits to the session it was fetched for; dropped if deleted since
            if let Some(session) = next.directory.get_mut(&session_id) {
                session.hydrate(messages);
            }
            Ok(TransitionResult::new(next))
        }

        // Soft-fail: buffer keeps its prior contents
        Event::HistoryFailed { .. } => Ok(TransitionResult::new(state.clone())),

        // ============================================================
        // Exchange Controller
        // ============================================================
        Event::InputChanged { text } => {
            let mut next = state.clone();
            next.draft = text;
            Ok(TransitionResult::new(next))
        }

        Event::SendRequested { text, message_id } => {
            let user_id = require_user(state)?;
            if state.pending {
                return Err(TransitionError::ExchangePending);
            }
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            let session_id = state
                .directory
                .active_id()
                .ok_or(TransitionError::NoActiveSession)?
                .to_string();

            let mut next = state.clone();
            // Phase one: optimistic append, captured target session
            if let Some(session) = next.directory.get_mut(&session_id) {
                session.append(Message::user(message_id, text.clone()));
            }
            next.draft.clear();
            next.sources.clear();
            next.pending = true;

            Ok(TransitionResult::new(next).with_effect(Effect::SendChat {
                user_id,
                session_id,
                query: text,
            }))
        }

        // Phase two: confirm into the originating session, never the active one
        Event::ReplyReceived {
            session_id,
            message_id,
            answer,
            sources,
        } => {
            let mut next = state.clone();
            if let Some(session) = next.directory.get_mut(&session_id) {
                session.append(Message::assistant(message_id, answer));
            }
            next.sources = sources;
            next.pending = false;
            Ok(TransitionResult::new(next))
        }

        // Phase two: compensate with a visible error message
        Event::ReplyFailed {
            session_id,
            message_id,
            ..
        } => {
            let mut next = state.clone();
            if let Some(session) = next.directory.get_mut(&session_id) {
                session.append(Message::assistant(message_id, EXCHANGE_FAILURE_TEXT));
            }
            next.sources.clear();
            next.pending = false;
            Ok(TransitionResult::new(next))
        }
    }
}

fn require_user(state: &AppState) -> Result<String, TransitionError> {
    state
        .user_id()
        .map(ToString::to_string)
        .ok_or(TransitionError::NotIdentified)
}
