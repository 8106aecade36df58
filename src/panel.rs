use std::sync::Arc;

use crate::backend::AssistantBackend;
use crate::chat::{ConversationPipeline, SendOutcome};
use crate::editor::EditorReconstructor;
use crate::host::{CredentialStore, HostPage};

const ENABLE_LOGS: bool = true;
const LOG_SCOPE: &str = "panel";

use crate::log_info;

pub const GREETING: &str = "👋 Hi! Ask me anything about this problem or your code to get started.";
pub const TYPING_INDICATOR: &str = "AI is typing...";

/// The assist surface: an activation control plus a conversation panel that
/// starts from an empty history every time it is opened.
pub struct AssistPanel {
    page: Arc<dyn HostPage>,
    credentials: Arc<dyn CredentialStore>,
    backend: Arc<dyn AssistantBackend>,
    reconstructor: EditorReconstructor,
    conversation: Option<Arc<ConversationPipeline>>,
}

impl AssistPanel {
    pub fn new(
        page: Arc<dyn HostPage>,
        credentials: Arc<dyn CredentialStore>,
        backend: Arc<dyn AssistantBackend>,
        reconstructor: EditorReconstructor,
    ) -> Self {
        Self {
            page,
            credentials,
            backend,
            reconstructor,
            conversation: None,
        }
    }

    /// The activation control is only offered once a credential is stored.
    pub fn is_available(credentials: &dyn CredentialStore) -> bool {
        let available = credentials
            .get_credential()
            .is_some_and(|key| !key.trim().is_empty());
        if !available {
            log_info!("No API key found, assist control not offered");
        }
        available
    }

    pub fn is_open(&self) -> bool {
        self.conversation.is_some()
    }

    /// Opening an already-open panel keeps its conversation.
    pub fn open(&mut self) -> Arc<ConversationPipeline> {
        if let Some(conversation) = &self.conversation {
            return conversation.clone();
        }

        let conversation = Arc::new(ConversationPipeline::new(
            self.page.clone(),
            self.credentials.clone(),
            self.backend.clone(),
            self.reconstructor.clone(),
        ));
        log_info!("opened conversation {}", conversation.session_id());
        self.conversation = Some(conversation.clone());
        conversation
    }

    /// Discards the conversation. A request still in flight finishes into
    /// the discarded history.
    pub fn close(&mut self) {
        if let Some(conversation) = self.conversation.take() {
            log_info!("closed conversation {}", conversation.session_id());
        }
    }

    pub fn conversation(&self) -> Option<Arc<ConversationPipeline>> {
        self.conversation.clone()
    }

    pub async fn send(&self, user_text: &str) -> SendOutcome {
        match &self.conversation {
            Some(conversation) => conversation.send(user_text).await,
            None => SendOutcome::Ignored,
        }
    }

    /// Lines the conversation panel shows, top to bottom.
    pub async fn transcript(&self) -> Vec<String> {
        let Some(conversation) = &self.conversation else {
            return Vec::new();
        };

        let history = conversation.history().await;
        let busy = conversation.status().is_busy();

        let mut lines: Vec<String> = history
            .iter()
            .map(|message| format!("{}: {}", message.role.label(), message.content))
            .collect();

        if history.is_empty() && !busy {
            lines.push(GREETING.to_string());
        }
        if busy {
            lines.push(TYPING_INDICATOR.to_string());
        }
        lines
    }
}
