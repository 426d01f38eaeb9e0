//! Mock backend for testing
//!
//! Responses are queued per operation; every call is recorded.

use crate::backend::{Backend, BackendError, ChatRequest, ChatResponse, RegisterUserRequest, UserRecord};
use crate::state_machine::{Message, Session, Source};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Queue<T> = Mutex<VecDeque<Result<T, BackendError>>>;

/// A backend call as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RegisterUser { email: String, username: String },
    ListSessions { user_id: String },
    CreateSession { user_id: String },
    DeleteSession { session_id: String },
    FetchHistory { session_id: String },
    Chat(ChatRequest),
}

/// Backend returning queued responses. An empty queue answers with a
/// network error.
#[derive(Default)]
pub struct MockBackend {
    users: Queue<UserRecord>,
    listings: Queue<Vec<Session>>,
    created: Queue<Session>,
    deletions: Queue<()>,
    histories: Mutex<HashMap<String, VecDeque<Vec<Message>>>>,
    replies: Queue<ChatResponse>,
    calls: Mutex<Vec<Call>>,
    /// Signalled once a chat request has been recorded
    pub chat_started: Arc<Notify>,
    /// When set, chat replies wait for `release_chat`
    chat_gate: Option<Arc<Notify>>,
    /// Signalled once a held history fetch has been recorded
    pub history_started: Arc<Notify>,
    hold_history: AtomicBool,
    history_gate: Notify,
}

fn unqueued<T>() -> Result<T, BackendError> {
    Err(BackendError::network("No mock response queued"))
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every chat reply until `release_chat` is called
    pub fn with_chat_gate(mut self) -> Self {
        self.chat_gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let one gated chat reply through
    pub fn release_chat(&self) {
        if let Some(gate) = &self.chat_gate {
            gate.notify_one();
        }
    }

    /// Hold the next history fetch until `release_history` is called.
    /// Later fetches answer immediately.
    pub fn hold_next_history(&self) {
        self.hold_history.store(true, Ordering::SeqCst);
    }

    pub fn release_history(&self) {
        self.history_gate.notify_one();
    }

    pub fn queue_user(&self, id: &str) {
        self.users.lock().unwrap().push_back(Ok(UserRecord {
            id: id.to_string(),
            email: None,
            username: None,
        }));
    }

    pub fn queue_user_error(&self, error: BackendError) {
        self.users.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_sessions(&self, ids: &[&str]) {
        let sessions = ids
            .iter()
            .map(|id| Session::new(*id, format!("Session {id}")))
            .collect();
        self.listings.lock().unwrap().push_back(Ok(sessions));
    }

    pub fn queue_listing_error(&self, error: BackendError) {
        self.listings.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_created(&self, id: &str, name: &str) {
        self.created
            .lock()
            .unwrap()
            .push_back(Ok(Session::new(id, name)));
    }

    pub fn queue_create_error(&self, error: BackendError) {
        self.created.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_deleted(&self) {
        self.deletions.lock().unwrap().push_back(Ok(()));
    }

    pub fn queue_delete_error(&self, error: BackendError) {
        self.deletions.lock().unwrap().push_back(Err(error));
    }

    /// Queue one history response for `session_id`
    pub fn queue_history(&self, session_id: &str, messages: Vec<Message>) {
        self.histories
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .push_back(messages);
    }

    pub fn queue_reply(&self, answer: &str, sources: Vec<Source>) {
        self.replies.lock().unwrap().push_back(Ok(ChatResponse {
            answer: answer.to_string(),
            sources: Some(sources),
        }));
    }

    pub fn queue_reply_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    pub fn history_fetches(&self, session_id: &str) -> usize {
        self.count(|c| matches!(c, Call::FetchHistory { session_id: id } if id == session_id))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn register_user(&self, request: &RegisterUserRequest) -> Result<UserRecord, BackendError> {
        self.record(Call::RegisterUser {
            email: request.email.clone(),
            username: request.username.clone(),
        });
        self.users.lock().unwrap().pop_front().unwrap_or_else(unqueued)
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError> {
        self.record(Call::ListSessions {
            user_id: user_id.to_string(),
        });
        self.listings.lock().unwrap().pop_front().unwrap_or_else(unqueued)
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, BackendError> {
        self.record(Call::CreateSession {
            user_id: user_id.to_string(),
        });
        self.created.lock().unwrap().pop_front().unwrap_or_else(unqueued)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        self.record(Call::DeleteSession {
            session_id: session_id.to_string(),
        });
        self.deletions.lock().unwrap().pop_front().unwrap_or_else(unqueued)
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BackendError> {
        self.record(Call::FetchHistory {
            session_id: session_id.to_string(),
        });
        if self.hold_history.swap(false, Ordering::SeqCst) {
            self.history_started.notify_one();
            self.history_gate.notified().await;
        }
        self.histories
            .lock()
            .unwrap()
            .get_mut(session_id)
            .and_then(VecDeque::pop_front)
            .map_or_else(unqueued, Ok)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        self.record(Call::Chat(request.clone()));
        self.chat_started.notify_one();
        if let Some(gate) = &self.chat_gate {
            gate.notified().await;
        }
        self.replies.lock().unwrap().pop_front().unwrap_or_else(unqueued)
    }
}
