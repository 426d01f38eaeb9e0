//! Backend service abstraction
//!
//! The HTTP contract the client consumes, plus a logging wrapper.

mod error;
mod http;
mod types;

pub use error::{BackendError, BackendErrorKind};
pub use http::HttpBackend;
pub use types::*;

use crate::state_machine::{Message, Session};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for the chat backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Exchange email and username for a user record
    async fn register_user(&self, request: &RegisterUserRequest) -> Result<UserRecord, BackendError>;

    /// List the user's sessions in backend order, messages empty
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError>;

    /// Create a new session for the user
    async fn create_session(&self, user_id: &str) -> Result<Session, BackendError>;

    /// Delete a session
    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError>;

    /// Fetch a session's ordered message history
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BackendError>;

    /// Run one chat exchange
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn register_user(&self, request: &RegisterUserRequest) -> Result<UserRecord, BackendError> {
        (**self).register_user(request).await
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError> {
        (**self).list_sessions(user_id).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, BackendError> {
        (**self).create_session(user_id).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        (**self).delete_session(session_id).await
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BackendError> {
        (**self).fetch_history(session_id).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        (**self).chat(request).await
    }
}

/// Logging wrapper for backend services
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B: Backend> LoggingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    fn log<T>(operation: &'static str, started: Instant, result: &Result<T, BackendError>) {
        let duration_ms = started.elapsed().as_millis();
        match result {
            Ok(_) => {
                tracing::debug!(operation, duration_ms = %duration_ms, "Backend call completed");
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    duration_ms = %duration_ms,
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Backend call failed"
                );
            }
        }
    }
}

#[async_trait]
impl<B: Backend> Backend for LoggingBackend<B> {
    async fn register_user(&self, request: &RegisterUserRequest) -> Result<UserRecord, BackendError> {
        let started = Instant::now();
        let result = self.inner.register_user(request).await;
        Self::log("register_user", started, &result);
        result
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError> {
        let started = Instant::now();
        let result = self.inner.list_sessions(user_id).await;
        Self::log("list_sessions", started, &result);
        result
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, BackendError> {
        let started = Instant::now();
        let result = self.inner.create_session(user_id).await;
        Self::log("create_session", started, &result);
        result
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        let started = Instant::now();
        let result = self.inner.delete_session(session_id).await;
        Self::log("delete_session", started, &result);
        result
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BackendError> {
        let started = Instant::now();
        let result = self.inner.fetch_history(session_id).await;
        Self::log("fetch_history", started, &result);
        result
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let started = Instant::now();
        let result = self.inner.chat(request).await;
        Self::log("chat", started, &result);
        result
    }
}
