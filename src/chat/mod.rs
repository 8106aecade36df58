pub mod pipeline;
pub mod state;

use chrono::{DateTime, Utc};

pub use pipeline::{ConversationPipeline, SendOutcome};
pub use state::PipelineStatus;

/// Shown when the backend answered but produced no usable text.
pub const NO_RESPONSE_NOTICE: &str = "⚠️ No response from AI.";
/// Shown when the backend could not be reached or rejected the request.
pub const ERROR_NOTICE: &str = "⚠️ Error contacting AI.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
