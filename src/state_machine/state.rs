//! Client state types

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// Backend-assigned user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
}

/// Identity gate. Nothing touches sessions until `Identified`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Unidentified,
    /// Registration request in flight
    Registering,
    Identified(User),
}

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Identified(user) => Some(&user.id),
            Identity::Unidentified | Identity::Registering => None,
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, Identity::Identified(_))
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One entry of a conversation.
///
/// Ids of locally created messages are only unique within the rendering
/// list; they are never reconciled with backend ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }

    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, content)
    }
}

/// Mint a fresh local message id
pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Sessions
// ============================================================================

/// A named conversation thread and its message log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub messages: Vec<Message>,
}

impl Session {
    /// Sessions from listing or creation start with an empty log
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            messages: Vec::new(),
        }
    }

    /// Replace the log wholesale with fetched history
    pub fn hydrate(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Logs are append-only
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Ordered set of the user's sessions plus the active pointer.
///
/// Invariant: `active`, when set, names a member of `sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionDirectory {
    sessions: Vec<Session>,
    active: Option<String>,
}

impl SessionDirectory {
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replace the whole listing. The first entry becomes active.
    /// Repeated ids keep their first occurrence.
    pub fn replace_all(&mut self, sessions: Vec<Session>) {
        self.sessions.clear();
        for session in sessions {
            if !self.contains(&session.id) {
                self.sessions.push(session);
            }
        }
        self.active = self.sessions.first().map(|s| s.id.clone());
    }

    /// Insert most-recent-first and make it active
    pub fn insert_front(&mut self, session: Session) {
        self.sessions.retain(|s| s.id != session.id);
        self.active = Some(session.id.clone());
        self.sessions.insert(0, session);
    }

    /// Point `active` at a member. Returns false if `id` is unknown.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    /// Remove a session. If it was active, the first remaining one takes
    /// over. Returns the removed session.
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        let removed = self.sessions.remove(index);
        if self.active.as_deref() == Some(id) {
            self.active = self.sessions.first().map(|s| s.id.clone());
        }
        Some(removed)
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Citation attached to the latest assistant reply.
///
/// The deployed backend reports `{source, page, score}` rather than
/// `{title, url}`, so both shapes decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "source")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Source {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            page: None,
            score: None,
        }
    }

    /// Text to show for the link
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Everything the client knows, mutated only through `transition`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub identity: Identity,
    /// Alert text from the last failed registration
    pub identity_error: Option<String>,
    pub directory: SessionDirectory,
    /// Contents of the message input field
    pub draft: String,
    /// Global in-flight exchange flag; gates every send
    pub pending: bool,
    /// Sources of the most recent reply
    pub sources: Vec<Source>,
}

impl AppState {
    pub fn user_id(&self) -> Option<&str> {
        self.identity.user_id()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.directory.active()
    }
}
