//! Effects produced by state transitions

/// Backend calls to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Exchange email and username for a user id
    RegisterUser { email: String, username: String },

    /// Load the user's session directory
    ListSessions { user_id: String },

    /// Create a new session for the user
    CreateSession { user_id: String },

    /// Delete a session on the backend
    DeleteSession { session_id: String },

    /// Hydrate a session's message log
    FetchHistory { session_id: String },

    /// Dispatch a chat query. `session_id` is captured when the send is
    /// accepted and is where the reply lands.
    SendChat {
        user_id: String,
        session_id: String,
        query: String,
    },
}

impl Effect {
    pub fn fetch_history(session_id: impl Into<String>) -> Self {
        Effect::FetchHistory {
            session_id: session_id.into(),
        }
    }
}
