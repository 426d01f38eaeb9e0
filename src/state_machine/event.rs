//! Events that can occur in the client

use crate::state_machine::state::{new_message_id, Message, Session, Source};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Identity events
    IdentitySubmitted {
        email: String,
        username: String,
    },
    IdentityRegistered {
        user_id: String,
    },
    IdentityFailed {
        message: String,
    },

    // Directory events
    SessionsListed {
        sessions: Vec<Session>,
    },
    SessionsListFailed {
        message: String,
    },
    CreateSessionRequested,
    SessionCreated {
        session: Session,
    },
    SessionCreateFailed {
        message: String,
    },
    DeleteSessionRequested {
        session_id: String,
    },
    SessionDeleted {
        session_id: String,
    },
    SessionDeleteFailed {
        session_id: String,
        message: String,
    },
    SessionSelected {
        session_id: String,
    },

    // History events
    HistoryLoaded {
        session_id: String,
        messages: Vec<Message>,
    },
    HistoryFailed {
        session_id: String,
        message: String,
    },

    // Exchange events
    InputChanged {
        text: String,
    },
    SendRequested {
        text: String,
        /// Id for the optimistic user message
        message_id: String,
    },
    ReplyReceived {
        /// Session the request was sent for
        session_id: String,
        message_id: String,
        answer: String,
        sources: Vec<Source>,
    },
    ReplyFailed {
        session_id: String,
        message_id: String,
        message: String,
    },
}

impl Event {
    pub fn send(text: impl Into<String>) -> Self {
        Event::SendRequested {
            text: text.into(),
            message_id: new_message_id(),
        }
    }

    pub fn select(session_id: impl Into<String>) -> Self {
        Event::SessionSelected {
            session_id: session_id.into(),
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::IdentitySubmitted { .. } => "identity_submitted",
            Event::IdentityRegistered { .. } => "identity_registered",
            Event::IdentityFailed { .. } => "identity_failed",
            Event::SessionsListed { .. } => "sessions_listed",
            Event::SessionsListFailed { .. } => "sessions_list_failed",
            Event::CreateSessionRequested => "create_session_requested",
            Event::SessionCreated { .. } => "session_created",
            Event::SessionCreateFailed { .. } => "session_create_failed",
            Event::DeleteSessionRequested { .. } => "delete_session_requested",
            Event::SessionDeleted { .. } => "session_deleted",
            Event::SessionDeleteFailed { .. } => "session_delete_failed",
            Event::SessionSelected { .. } => "session_selected",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::HistoryFailed { .. } => "history_failed",
            Event::InputChanged { .. } => "input_changed",
            Event::SendRequested { .. } => "send_requested",
            Event::ReplyReceived { .. } => "reply_received",
            Event::ReplyFailed { .. } => "reply_failed",
        }
    }
}
