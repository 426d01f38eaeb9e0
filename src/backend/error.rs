//! Backend error types

use thiserror::Error;

/// Failure of a single backend call.
///
/// Callers treat every kind the same way; the kind only feeds logs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn status(status: u16, body: &str) -> Self {
        let mut err = Self::new(BackendErrorKind::Status, format!("HTTP {status}: {body}"));
        err.status = Some(status);
        err
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Decode, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Config, message)
    }
}

/// Error classification for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connect failures, timeouts, broken bodies
    Network,
    /// Non-2xx response
    Status,
    /// 2xx response whose body did not match the contract
    Decode,
    /// Unusable client settings, such as a malformed base URL
    Config,
}

impl BackendErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Status => "status",
            Self::Decode => "decode",
            Self::Config => "config",
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            BackendError::network(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            BackendError::decode(format!("Failed to parse response: {e}"))
        } else {
            BackendError::network(format!("Request failed: {e}"))
        }
    }
}
