//! Assistant backend boundary.
//!
//! A backend turns one composed prompt plus the raw user text into a
//! [`Reply`]. Transport problems are [`BackendError`]s; a well-formed
//! response that simply carries no text is [`Reply::Empty`], not an error.

mod gemini;

pub use gemini::{GeminiBackend, GeminiConfig, DEFAULT_MODEL, GOOGLE_API_BASE};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from talking to the assistant backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request never completed (DNS, TLS, connection reset, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Body was not JSON at all.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Decoded backend answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Response parsed but had no candidate text.
    Empty,
}

/// One turn's worth of request content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistRequest {
    pub prompt: String,
    pub user_text: String,
}

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// `credential` is passed through unvalidated; a missing one surfaces
    /// as whatever authentication failure the backend reports.
    async fn generate(
        &self,
        credential: Option<&str>,
        request: &AssistRequest,
    ) -> BackendResult<Reply>;
}
