/// Where the pipeline is within a single user turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineStatus {
    #[default]
    Idle,
    /// Reading the page and reconstructing the editor.
    AwaitingContext,
    /// Backend call in flight.
    AwaitingResponse,
}

impl PipelineStatus {
    pub fn is_busy(&self) -> bool {
        !matches!(self, PipelineStatus::Idle)
    }
}
