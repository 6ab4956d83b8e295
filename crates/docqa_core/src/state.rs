use std::collections::BTreeSet;
use std::time::Duration;

use crate::view_model::{AppViewModel, DocumentRowView};
use crate::{
    Cadence, CadenceControl, DocumentId, DocumentRegistry, Effect, InFlight, Monitor, NoticeKind,
    Notices, RequestKind, Selection, SessionConfig, TaskTracker, Transcript,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Ended,
}

/// An irreversible action waiting for the user's yes/no.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmation {
    Reset,
    Delete(DocumentId),
}

/// Whether summarize can run against the current selection, and why not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizeReadiness {
    NoneSelected,
    MultipleSelected,
    /// The selected id is not in the registry.
    NotFound,
    NotReady,
    Ready(DocumentId),
}

impl SummarizeReadiness {
    pub fn refusal_message(self) -> Option<&'static str> {
        match self {
            SummarizeReadiness::NoneSelected => Some("Select a document to summarize"),
            SummarizeReadiness::MultipleSelected => Some("Select exactly one document"),
            SummarizeReadiness::NotFound => Some("Selected document is no longer available"),
            SummarizeReadiness::NotReady => Some("Document still ingesting"),
            SummarizeReadiness::Ready(_) => None,
        }
    }
}

/// Whole client session: every piece of mutable state lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    session: SessionState,
    config: SessionConfig,
    registry: DocumentRegistry,
    tasks: TaskTracker,
    task_polling: bool,
    selection: Selection,
    transcript: Transcript,
    in_flight: InFlight,
    active_answer_documents: BTreeSet<DocumentId>,
    monitor: Monitor,
    notices: Notices,
    cadence: CadenceControl,
    pending_confirmation: Option<PendingConfirmation>,
    uploads_in_flight: usize,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            session: SessionState::Idle,
            registry: DocumentRegistry::new(),
            tasks: TaskTracker::new(),
            task_polling: false,
            selection: Selection::new(),
            transcript: Transcript::new(),
            in_flight: InFlight::default(),
            active_answer_documents: BTreeSet::new(),
            monitor: Monitor::new(),
            notices: Notices::with_default_ttl(config.default_notice_ttl_ms),
            cadence: CadenceControl::new(config.slow_down_after),
            pending_confirmation: None,
            uploads_in_flight: 0,
            dirty: false,
            config,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    pub fn is_task_polling(&self) -> bool {
        self.task_polling
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    pub fn active_answer_documents(&self) -> &BTreeSet<DocumentId> {
        &self.active_answer_documents
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn cadence(&self) -> &CadenceControl {
        &self.cadence
    }

    pub fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        self.pending_confirmation
    }

    pub fn summarize_readiness(&self) -> SummarizeReadiness {
        match self.selection.len() {
            0 => SummarizeReadiness::NoneSelected,
            1 => {
                let Some(id) = self.selection.single() else {
                    return SummarizeReadiness::NoneSelected;
                };
                match self.registry.get(id) {
                    None => SummarizeReadiness::NotFound,
                    Some(doc) if !doc.status.is_queryable() => SummarizeReadiness::NotReady,
                    Some(_) => SummarizeReadiness::Ready(id),
                }
            }
            _ => SummarizeReadiness::MultipleSelected,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let documents = self
            .registry
            .documents()
            .iter()
            .map(|doc| DocumentRowView {
                id: doc.id,
                filename: doc.filename.clone(),
                status: doc.status,
                label: doc.status.label(),
                selected: self.selection.contains(doc.id),
                used_in_answer: self.active_answer_documents.contains(&doc.id),
                task_pending: self.tasks.task_for(doc.id).is_some(),
            })
            .collect();

        AppViewModel {
            session: self.session,
            documents,
            document_count: self.registry.len(),
            ingested_count: self.registry.ingested_count(),
            ingesting: self.registry.any_ingesting(),
            selected: self.selection.ids().iter().copied().collect(),
            active_answer_documents: self.active_answer_documents.iter().copied().collect(),
            transcript: self.transcript.turns().to_vec(),
            transcript_revision: self.transcript.revision(),
            notices: self.notices.entries().to_vec(),
            asking: self.in_flight.is_busy(RequestKind::Ask),
            summarizing: self.in_flight.is_busy(RequestKind::Summarize),
            resetting: self.in_flight.is_busy(RequestKind::Reset),
            uploads_in_flight: self.uploads_in_flight,
            summarize: self.summarize_readiness(),
            health: self.monitor.health().cloned(),
            health_degraded: self.monitor.is_degraded(),
            credential: self.monitor.credential().cloned(),
            pending_confirmation: self.pending_confirmation,
            pending_task_count: self.tasks.len(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn start_session(&mut self) {
        self.session = SessionState::Running;
        self.mark_dirty();
    }

    pub(crate) fn end_session(&mut self) {
        self.session = SessionState::Ended;
        self.task_polling = false;
        self.mark_dirty();
    }

    pub(crate) fn refresh_period(&self, cadence: Cadence) -> Duration {
        match cadence {
            Cadence::Fast => self.config.fast_refresh,
            Cadence::Slow => self.config.slow_refresh,
        }
    }

    /// Pushes a notice and returns the expiry effect for it, if it expires.
    pub(crate) fn notify(&mut self, message: impl Into<String>, kind: NoticeKind) -> Vec<Effect> {
        let notice = self.notices.push(message, kind, None);
        self.mark_dirty();
        notice
            .expires_after()
            .map(|after| Effect::ExpireNotice {
                id: notice.id,
                after,
            })
            .into_iter()
            .collect()
    }

    pub(crate) fn dismiss_notice(&mut self, id: &str) {
        if self.notices.dismiss(id) {
            self.mark_dirty();
        }
    }

    pub(crate) fn registry_mut(&mut self) -> &mut DocumentRegistry {
        &mut self.registry
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut TaskTracker {
        &mut self.tasks
    }

    pub(crate) fn set_task_polling(&mut self, polling: bool) {
        self.task_polling = polling;
    }

    pub(crate) fn selection_and_registry(&mut self) -> (&mut Selection, &DocumentRegistry) {
        (&mut self.selection, &self.registry)
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub(crate) fn in_flight_mut(&mut self) -> &mut InFlight {
        &mut self.in_flight
    }

    pub(crate) fn set_active_answer_documents(&mut self, ids: BTreeSet<DocumentId>) {
        self.active_answer_documents = ids;
    }

    pub(crate) fn monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitor
    }

    pub(crate) fn cadence_mut(&mut self) -> &mut CadenceControl {
        &mut self.cadence
    }

    pub(crate) fn set_pending_confirmation(&mut self, pending: Option<PendingConfirmation>) {
        self.pending_confirmation = pending;
        self.mark_dirty();
    }

    pub(crate) fn take_pending_confirmation(&mut self) -> Option<PendingConfirmation> {
        self.pending_confirmation.take()
    }

    pub(crate) fn upload_started(&mut self) {
        self.uploads_in_flight += 1;
        self.mark_dirty();
    }

    pub(crate) fn upload_finished(&mut self) {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
        self.mark_dirty();
    }

    /// Local half of a reset: transcript, selection and answer highlights go.
    /// Replies to asks or summaries still in flight are dropped on arrival.
    pub(crate) fn clear_after_reset(&mut self) {
        self.transcript.clear();
        self.in_flight.orphan_transcript_requests();
        self.selection.clear();
        self.active_answer_documents.clear();
        self.tasks.clear();
        self.mark_dirty();
    }
}
