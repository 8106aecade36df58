use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use super::{AssistRequest, AssistantBackend, BackendError, BackendResult, Reply};

const ENABLE_LOGS: bool = true;
const LOG_SCOPE: &str = "gemini";

use crate::{log_info, log_warn};

/// Google Generative Language API base URL.
pub const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    /// Overridable so tests can point at a local mock server.
    pub api_base: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: GOOGLE_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(request: &'a AssistRequest) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: [
                    Part {
                        text: &request.prompt,
                    },
                    Part {
                        text: &request.user_text,
                    },
                ],
            }],
        }
    }
}

/// `generateContent` client for Gemini models, authenticated by API key.
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a backend with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl AssistantBackend for GeminiBackend {
    async fn generate(
        &self,
        credential: Option<&str>,
        request: &AssistRequest,
    ) -> BackendResult<Reply> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        log_info!(
            "sending request to {} ({} prompt chars)",
            self.config.model,
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", credential.unwrap_or_default())])
            .headers(headers)
            .json(&GenerateRequest::new(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log_warn!("backend answered {}", status.as_u16());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body)?;
        Ok(extract_reply(&payload))
    }
}

/// First candidate's first text part, or [`Reply::Empty`] when the payload
/// lacks it.
fn extract_reply(payload: &Value) -> Reply {
    match payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
    {
        Some(text) if !text.is_empty() => Reply::Text(text.to_string()),
        _ => Reply::Empty,
    }
}
