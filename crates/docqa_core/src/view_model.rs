use crate::{
    CredentialStatus, DocumentId, DocumentStatus, HealthSnapshot, Notice, PendingConfirmation,
    SessionState, SummarizeReadiness, Turn,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub session: SessionState,
    pub documents: Vec<DocumentRowView>,
    pub document_count: usize,
    pub ingested_count: usize,
    pub ingesting: bool,
    pub selected: Vec<DocumentId>,
    pub active_answer_documents: Vec<DocumentId>,
    pub transcript: Vec<Turn>,
    pub transcript_revision: u64,
    pub notices: Vec<Notice>,
    pub asking: bool,
    pub summarizing: bool,
    pub resetting: bool,
    pub uploads_in_flight: usize,
    pub summarize: SummarizeReadiness,
    pub health: Option<HealthSnapshot>,
    pub health_degraded: bool,
    pub credential: Option<CredentialStatus>,
    pub pending_confirmation: Option<PendingConfirmation>,
    pub pending_task_count: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRowView {
    pub id: DocumentId,
    pub filename: String,
    pub status: DocumentStatus,
    pub label: &'static str,
    pub selected: bool,
    pub used_in_answer: bool,
    pub task_pending: bool,
}

impl AppViewModel {
    /// Asking is allowed when nothing ingests and no ask is outstanding.
    /// Health is advisory only and does not factor in.
    pub fn can_ask(&self) -> bool {
        !self.ingesting && !self.asking
    }
}
