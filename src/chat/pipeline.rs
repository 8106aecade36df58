use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::backend::{AssistRequest, AssistantBackend, Reply};
use crate::editor::EditorReconstructor;
use crate::host::{CredentialStore, HostPage, PageContext};
use crate::prompt;
use crate::utils::logging::preview;

use super::{Message, PipelineStatus, ERROR_NOTICE, NO_RESPONSE_NOTICE};

const ENABLE_LOGS: bool = true;
const LOG_SCOPE: &str = "chat";

use crate::{log_error, log_info};

const SOLUTION_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or another send in flight; history untouched.
    Ignored,
    Answered,
    /// Backend replied without usable text.
    NoAnswer,
    /// Transport or status failure.
    Failed,
}

/// Linear chat history plus the single-flight machinery that feeds it.
pub struct ConversationPipeline {
    session_id: String,
    page: Arc<dyn HostPage>,
    credentials: Arc<dyn CredentialStore>,
    backend: Arc<dyn AssistantBackend>,
    reconstructor: EditorReconstructor,
    history: Mutex<Vec<Message>>,
    // std mutex: only touched in short critical sections, and released from Drop.
    status: StdMutex<PipelineStatus>,
}

impl ConversationPipeline {
    pub fn new(
        page: Arc<dyn HostPage>,
        credentials: Arc<dyn CredentialStore>,
        backend: Arc<dyn AssistantBackend>,
        reconstructor: EditorReconstructor,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            page,
            credentials,
            backend,
            reconstructor,
            history: Mutex::new(Vec::new()),
            status: StdMutex::new(PipelineStatus::Idle),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn status(&self) -> PipelineStatus {
        *lock_status(&self.status)
    }

    pub async fn history(&self) -> Vec<Message> {
        self.history.lock().await.clone()
    }

    /// Run one user turn. Every accepted turn ends with exactly one
    /// assistant message, answer or notice.
    pub async fn send(&self, user_text: &str) -> SendOutcome {
        if user_text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        let Some(flight) = InFlight::acquire(&self.status) else {
            log_info!("send ignored, a request is already in flight");
            return SendOutcome::Ignored;
        };

        self.history.lock().await.push(Message::user(user_text));

        let context = PageContext::read(self.page.as_ref());
        let solution = match self.page.editor() {
            Some(editor) => self.reconstructor.reconstruct(editor).await,
            None => String::new(),
        };

        log_info!("Problem: {}", preview(&context.problem_statement, SOLUTION_PREVIEW_CHARS));
        log_info!("Language: {}", context.language);
        log_info!(
            "User Solution (first {} chars): {}",
            SOLUTION_PREVIEW_CHARS,
            preview(&solution, SOLUTION_PREVIEW_CHARS)
        );

        let request = AssistRequest {
            prompt: prompt::compose(
                &context.problem_statement,
                &context.language,
                Some(solution.as_str()),
            ),
            user_text: user_text.to_string(),
        };

        flight.advance(PipelineStatus::AwaitingResponse);
        let credential = self.credentials.get_credential();
        let started = Instant::now();

        let (reply, outcome) = match self
            .backend
            .generate(credential.as_deref(), &request)
            .await
        {
            Ok(Reply::Text(text)) => (text, SendOutcome::Answered),
            Ok(Reply::Empty) => {
                log_info!("backend returned no candidate text");
                (NO_RESPONSE_NOTICE.to_string(), SendOutcome::NoAnswer)
            }
            Err(err) => {
                log_error!("Error fetching AI response: {err}");
                (ERROR_NOTICE.to_string(), SendOutcome::Failed)
            }
        };

        log_info!(
            "session {} turn finished in {}ms ({:?})",
            self.session_id,
            started.elapsed().as_millis(),
            outcome
        );

        self.history.lock().await.push(Message::assistant(reply));
        drop(flight);
        outcome
    }
}

fn lock_status(status: &StdMutex<PipelineStatus>) -> std::sync::MutexGuard<'_, PipelineStatus> {
    status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Claim on the single in-flight slot. Returns the pipeline to idle when
/// dropped, so a cancelled or panicking turn never wedges it.
struct InFlight<'a> {
    status: &'a StdMutex<PipelineStatus>,
}

impl<'a> InFlight<'a> {
    fn acquire(status: &'a StdMutex<PipelineStatus>) -> Option<Self> {
        let mut guard = lock_status(status);
        if guard.is_busy() {
            return None;
        }
        *guard = PipelineStatus::AwaitingContext;
        Some(Self { status })
    }

    fn advance(&self, next: PipelineStatus) {
        *lock_status(self.status) = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock_status(self.status) = PipelineStatus::Idle;
    }
}
