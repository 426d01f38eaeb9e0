//! Client runtime executor

use crate::backend::{
    Backend, BackendError, ChatRequest, HttpBackend, LoggingBackend, RegisterUserRequest,
};
use crate::config::ClientConfig;
use crate::state_machine::state::new_message_id;
use crate::state_machine::{
    transition, AppState, Effect, Event, TransitionError, IDENTITY_FAILURE_TEXT,
};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Errors surfaced by the client API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was refused by a guard; nothing changed
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    /// Identity registration failed; safe to retry
    #[error("{0}")]
    Registration(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Drives the state machine against a backend.
///
/// State changes are applied under a lock that is never held across a
/// backend call, so a slow reply and a session switch can interleave;
/// each result commits to the session it was requested for.
pub struct ChatClient<B> {
    state: Arc<Mutex<AppState>>,
    backend: Arc<B>,
}

impl<B> Clone for ChatClient<B> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl ChatClient<LoggingBackend<HttpBackend>> {
    /// Client for the HTTP backend described by `config`
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let backend = HttpBackend::new(config)?;
        tracing::info!(backend_url = %config.backend_url, "Chat client configured");
        Ok(Self::new(LoggingBackend::new(backend)))
    }
}

impl<B: Backend> ChatClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::default())),
            backend: Arc::new(backend),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    /// Read the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }

    // ==================== Identity ====================

    /// Register identity. On success, the session directory is loaded and
    /// the first session hydrated before this returns.
    pub async fn submit_identity(&self, email: &str, username: &str) -> Result<String, ClientError> {
        self.dispatch(Event::IdentitySubmitted {
            email: email.to_string(),
            username: username.to_string(),
        })
        .await?;

        self.read(|state| match state.user_id() {
            Some(id) => Ok(id.to_string()),
            None => Err(ClientError::Registration(
                state
                    .identity_error
                    .clone()
                    .unwrap_or_else(|| IDENTITY_FAILURE_TEXT.to_string()),
            )),
        })
    }

    // ==================== Session Directory ====================

    pub async fn create_session(&self) -> Result<(), ClientError> {
        Ok(self.dispatch(Event::CreateSessionRequested).await?)
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), ClientError> {
        Ok(self
            .dispatch(Event::DeleteSessionRequested {
                session_id: session_id.to_string(),
            })
            .await?)
    }

    pub async fn select_session(&self, session_id: &str) -> Result<(), ClientError> {
        Ok(self.dispatch(Event::select(session_id)).await?)
    }

    // ==================== Exchange ====================

    /// Update the input field
    pub fn set_input(&self, text: impl Into<String>) {
        let applied = self.apply(Event::InputChanged { text: text.into() });
        debug_assert!(applied.is_ok_and(|effects| effects.is_empty()));
    }

    /// Send `text` to the active session and wait for the exchange to settle
    pub async fn send(&self, text: impl Into<String>) -> Result<(), ClientError> {
        Ok(self.dispatch(Event::send(text)).await?)
    }

    /// Send the contents of the input field
    pub async fn send_draft(&self) -> Result<(), ClientError> {
        let text = self.read(|state| state.draft.clone());
        self.send(text).await
    }

    /// Accept `text` as a send right away and hand back the rest of the
    /// exchange as a future. Guard rejections surface here, before any
    /// network call; once this returns `Ok` the state is pending.
    pub fn begin_send(
        &self,
        text: String,
    ) -> Result<impl Future<Output = ()> + Send + 'static, ClientError>
    where
        B: 'static,
    {
        let effects = self.apply(Event::send(text))?;
        let client = self.clone();
        Ok(async move {
            if let Err(e) = client.run(effects).await {
                tracing::debug!(reason = %e, "Exchange follow-up rejected");
            }
        })
    }

    /// `begin_send` with the contents of the input field
    pub fn begin_send_draft(
        &self,
    ) -> Result<impl Future<Output = ()> + Send + 'static, ClientError>
    where
        B: 'static,
    {
        let text = self.read(|state| state.draft.clone());
        self.begin_send(text)
    }

    // ==================== Event Loop ====================

    /// Apply an event and run every effect it leads to, feeding effect
    /// outcomes back in until nothing is left.
    pub async fn dispatch(&self, event: Event) -> Result<(), TransitionError> {
        let effects = self.apply(event)?;
        self.run(effects).await
    }

    /// Execute already-committed effects and everything they lead to
    async fn run(&self, effects: Vec<Effect>) -> Result<(), TransitionError> {
        let mut events = VecDeque::new();
        for effect in effects {
            events.push_back(self.execute_effect(effect).await);
        }

        while let Some(current) = events.pop_front() {
            for effect in self.apply(current)? {
                let outcome = self.execute_effect(effect).await;
                events.push_back(outcome);
            }
        }

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        // Transitions are pure, so a poisoned lock still holds a whole state
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one pure transition and commit it
    fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let name = event.name();
        let mut state = self.lock();
        match transition(&state, event) {
            Ok(result) => {
                *state = result.new_state;
                Ok(result.effects)
            }
            Err(e) => {
                tracing::debug!(event = name, reason = %e, "Event rejected");
                Err(e)
            }
        }
    }

    /// Perform a backend call and describe its outcome as an event
    async fn execute_effect(&self, effect: Effect) -> Event {
        match effect {
            Effect::RegisterUser { email, username } => {
                let request = RegisterUserRequest { email, username };
                match self.backend.register_user(&request).await {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, "Identity established");
                        Event::IdentityRegistered { user_id: user.id }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Identity registration failed");
                        Event::IdentityFailed { message: e.message }
                    }
                }
            }

            Effect::ListSessions { user_id } => match self.backend.list_sessions(&user_id).await {
                Ok(sessions) => {
                    tracing::info!(%user_id, count = sessions.len(), "Sessions listed");
                    Event::SessionsListed { sessions }
                }
                Err(e) => {
                    tracing::warn!(%user_id, error = %e, "Session listing failed, showing none");
                    Event::SessionsListFailed { message: e.message }
                }
            },

            Effect::CreateSession { user_id } => match self.backend.create_session(&user_id).await {
                Ok(session) => {
                    tracing::info!(session_id = %session.id, "Session created");
                    Event::SessionCreated { session }
                }
                Err(e) => {
                    tracing::warn!(%user_id, error = %e, "Session creation failed");
                    Event::SessionCreateFailed { message: e.message }
                }
            },

            Effect::DeleteSession { session_id } => {
                match self.backend.delete_session(&session_id).await {
                    Ok(()) => {
                        tracing::info!(%session_id, "Session deleted");
                        Event::SessionDeleted { session_id }
                    }
                    Err(e) => {
                        tracing::warn!(%session_id, error = %e, "Session deletion failed");
                        Event::SessionDeleteFailed {
                            session_id,
                            message: e.message,
                        }
                    }
                }
            }

            Effect::FetchHistory { session_id } => {
                match self.backend.fetch_history(&session_id).await {
                    Ok(messages) => {
                        tracing::debug!(%session_id, count = messages.len(), "History loaded");
                        Event::HistoryLoaded {
                            session_id,
                            messages,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(%session_id, error = %e, "History fetch failed");
                        Event::HistoryFailed {
                            session_id,
                            message: e.message,
                        }
                    }
                }
            }

            Effect::SendChat {
                user_id,
                session_id,
                query,
            } => {
                let request = ChatRequest {
                    user_id,
                    session_id,
                    query,
                };
                match self.backend.chat(&request).await {
                    Ok(response) => {
                        let sources = response.sources.unwrap_or_default();
                        tracing::debug!(
                            session_id = %request.session_id,
                            sources = sources.len(),
                            "Reply received"
                        );
                        Event::ReplyReceived {
                            session_id: request.session_id,
                            message_id: new_message_id(),
                            answer: response.answer,
                            sources,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %request.session_id, error = %e, "Chat exchange failed");
                        Event::ReplyFailed {
                            session_id: request.session_id,
                            message_id: new_message_id(),
                            message: e.message,
                        }
                    }
                }
            }
        }
    }
}
