pub mod backend;
pub mod chat;
pub mod editor;
pub mod host;
pub mod panel;
pub mod prompt;
pub mod settings;
pub mod utils;

pub use backend::{AssistantBackend, BackendError, GeminiBackend, GeminiConfig, Reply};
pub use chat::{ConversationPipeline, Message, PipelineStatus, Role, SendOutcome};
pub use editor::{EditorReconstructor, EditorSurface, ReconstructConfig, ScrollContainer};
pub use host::{CredentialStore, HostPage, StaticPage};
pub use panel::AssistPanel;
pub use settings::{AssistSettings, SettingsStore};
