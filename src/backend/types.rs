//! Wire types for the backend's JSON contract

use crate::state_machine::{Message, Session, Source};
use serde::{Deserialize, Serialize};

/// Body of `POST /user/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub username: String,
}

/// Response of `POST /user/`. Only `id` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Body of `POST /sessions/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSessionRequest {
    pub user_id: String,
}

/// Entry of `GET /sessions/` and response of `POST /sessions/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Session::new(record.id, record.name)
    }
}

/// Response of `GET /sessions/<id>/history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<Message>,
}

/// Body of `POST /chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub session_id: String,
    pub query: String,
}

/// Response of `POST /chat/`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}
