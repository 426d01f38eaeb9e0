//! HTTP implementation of the backend contract

use super::types::{
    ChatRequest, ChatResponse, CreateSessionRequest, HistoryResponse, RegisterUserRequest,
    SessionRecord, UserRecord,
};
use super::{Backend, BackendError};
use crate::config::ClientConfig;
use crate::state_machine::{Message, Session};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

/// JSON-over-HTTP backend client
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.backend_url)
            .map_err(|e| BackendError::config(format!("Invalid backend URL {}: {e}", config.backend_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::config(format!(
                "Backend URL cannot be a base: {}",
                config.backend_url
            )));
        }

        // No timeout unless configured; a request stays pending until the
        // transport resolves it
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Build an endpoint URL from path segments. A trailing `""` segment
    /// yields the trailing slash the backend's collection routes expect.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::config("Backend URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_body(response: Response) -> Result<String, BackendError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("Failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(BackendError::status(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| BackendError::decode(format!("Failed to parse response: {e} - body: {body}")))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn register_user(&self, request: &RegisterUserRequest) -> Result<UserRecord, BackendError> {
        let response = self
            .client
            .post(self.endpoint(&["user", ""])?)
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&["sessions", ""])?)
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        let records: Vec<SessionRecord> = Self::read_json(response).await?;
        Ok(records.into_iter().map(Session::from).collect())
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, BackendError> {
        let response = self
            .client
            .post(self.endpoint(&["sessions", ""])?)
            .json(&CreateSessionRequest {
                user_id: user_id.to_string(),
            })
            .send()
            .await?;
        let record: SessionRecord = Self::read_json(response).await?;
        Ok(record.into())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.endpoint(&["sessions", session_id])?)
            .send()
            .await?;
        Self::read_body(response).await.map(|_| ())
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&["sessions", session_id, "history"])?)
            .send()
            .await?;
        let history: HistoryResponse = Self::read_json(response).await?;
        Ok(history.messages)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let response = self
            .client
            .post(self.endpoint(&["chat", ""])?)
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }
}
