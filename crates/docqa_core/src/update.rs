use docqa_logging::{docqa_debug, docqa_info, docqa_warn};

use crate::state::PendingConfirmation;
use crate::{
    is_trackable_task_id, Answer, AppState, CredentialAction, Document, DocumentId, Effect, Msg,
    NoticeKind, PollApplied, RequestKind, ResetOutcome, ResetReport, SessionState, TaskPoll, Turn,
    UploadReceipt,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.session() == SessionState::Ended {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SessionStarted => {
            if state.session() == SessionState::Running {
                return (state, Vec::new());
            }
            state.start_session();
            let period = state.refresh_period(state.cadence().current());
            vec![
                Effect::RefreshDocuments,
                Effect::FetchHealth,
                Effect::FetchDiagnostics,
                Effect::SetRefreshCadence { period },
            ]
        }
        Msg::SessionEnded => {
            state.end_session();
            vec![Effect::StopTimers]
        }
        Msg::RefreshTick => vec![
            Effect::RefreshDocuments,
            Effect::FetchHealth,
            Effect::FetchDiagnostics,
        ],
        Msg::TaskPollTick => {
            if !state.is_task_polling() {
                return (state, Vec::new());
            }
            state
                .tasks()
                .pending()
                .map(|(document_id, task_id)| Effect::PollTask {
                    document_id,
                    task_id: task_id.to_string(),
                })
                .collect()
        }
        Msg::DocumentsLoaded(documents) => apply_documents(&mut state, documents),
        Msg::HealthLoaded(health) => {
            if state.monitor_mut().record_health(health) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DiagnosticsLoaded(diagnostics) => {
            if state.monitor_mut().record_diagnostics(diagnostics) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadRequested { path } => {
            state.upload_started();
            vec![Effect::UploadFile { path }]
        }
        Msg::UploadCompleted { filename, result } => apply_upload(&mut state, filename, result),
        Msg::TaskPolled {
            document_id,
            task_id,
            poll,
        } => apply_task_poll(&mut state, document_id, &task_id, &poll),
        Msg::SelectionToggled(id) => {
            let (selection, registry) = state.selection_and_registry();
            if selection.toggle(id, registry) {
                state.mark_dirty();
            } else {
                docqa_debug!("Ignoring selection of unknown document {}", id);
            }
            Vec::new()
        }
        Msg::QuestionSubmitted(raw) => submit_question(&mut state, &raw),
        Msg::AskCompleted(result) => apply_answer(&mut state, result),
        Msg::SummarizeClicked => request_summary(&mut state),
        Msg::SummaryCompleted {
            document_id,
            result,
        } => apply_summary(&mut state, document_id, result),
        Msg::DeleteClicked(document_id) => {
            if state.registry().contains(document_id) {
                state.set_pending_confirmation(Some(PendingConfirmation::Delete(document_id)));
            }
            Vec::new()
        }
        Msg::DeleteCompleted {
            document_id,
            result,
        } => {
            let mut effects = match result {
                Ok(()) => {
                    docqa_info!("Deleted document {}", document_id);
                    state.notify("Deleted", NoticeKind::Info)
                }
                Err(err) => {
                    docqa_warn!("Delete of document {} failed: {}", document_id, err);
                    state.notify("Delete failed", NoticeKind::Error)
                }
            };
            effects.push(Effect::RefreshDocuments);
            effects
        }
        Msg::ResetClicked => {
            if state.in_flight().is_busy(RequestKind::Reset) {
                docqa_debug!("Reset already in flight; ignoring request");
                return (state, Vec::new());
            }
            state.set_pending_confirmation(Some(PendingConfirmation::Reset));
            Vec::new()
        }
        Msg::ConfirmationAnswered(confirmed) => answer_confirmation(&mut state, confirmed),
        Msg::ResetCompleted(result) => apply_reset(&mut state, result),
        Msg::CredentialSubmitted(raw) => {
            let key = raw.trim();
            if key.is_empty() {
                state.notify("Enter a key first", NoticeKind::Error)
            } else {
                vec![Effect::SetCredential {
                    key: key.to_string(),
                }]
            }
        }
        Msg::CredentialClearRequested => vec![Effect::ClearCredential],
        Msg::CredentialUpdated { action, result } => {
            let mut effects = match (action, &result) {
                (CredentialAction::Set, Ok(())) => state.notify("Key set", NoticeKind::Success),
                (CredentialAction::Set, Err(_)) => {
                    state.notify("Failed to set key", NoticeKind::Error)
                }
                (CredentialAction::Clear, Ok(())) => state.notify("Key cleared", NoticeKind::Info),
                (CredentialAction::Clear, Err(_)) => {
                    state.notify("Failed to clear key", NoticeKind::Error)
                }
            };
            if let Err(err) = result {
                docqa_warn!("Credential {:?} failed: {}", action, err);
            }
            effects.push(Effect::FetchDiagnostics);
            effects
        }
        Msg::NoticeDismissed(id) | Msg::NoticeExpired(id) => {
            state.dismiss_notice(&id);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

/// Replaces the registry, prunes the selection against it and re-evaluates
/// the refresh cadence, all within one update.
fn apply_documents(state: &mut AppState, documents: Vec<Document>) -> Vec<Effect> {
    if state.registry_mut().replace(documents) {
        state.mark_dirty();
    }
    let (selection, registry) = state.selection_and_registry();
    let pruned = selection.reconcile(registry);
    if pruned > 0 {
        docqa_debug!("Pruned {} stale selected document(s)", pruned);
        state.mark_dirty();
    }

    let any_ingesting = state.registry().any_ingesting();
    match state.cadence_mut().observe(any_ingesting) {
        Some(cadence) => {
            let period = state.refresh_period(cadence);
            docqa_info!("Refresh cadence now {:?} ({:?})", cadence, period);
            if state.session() == SessionState::Running {
                vec![Effect::SetRefreshCadence { period }]
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    }
}

fn apply_upload(
    state: &mut AppState,
    filename: String,
    result: Result<UploadReceipt, String>,
) -> Vec<Effect> {
    state.upload_finished();
    let mut effects = match result {
        Ok(receipt) => {
            let mut effects = Vec::new();
            if is_trackable_task_id(&receipt.task_id) {
                let first = state
                    .tasks_mut()
                    .register(receipt.document_id, receipt.task_id);
                if first && !state.is_task_polling() {
                    state.set_task_polling(true);
                    effects.push(Effect::StartTaskPolling {
                        period: state.config().task_poll,
                    });
                }
            }
            effects.extend(state.notify(format!("Uploaded {filename}"), NoticeKind::Success));
            effects
        }
        Err(err) => {
            docqa_warn!("Upload of {} failed: {}", filename, err);
            state.notify(format!("Upload failed: {filename}"), NoticeKind::Error)
        }
    };
    effects.push(Effect::RefreshDocuments);
    effects
}

fn apply_task_poll(
    state: &mut AppState,
    document_id: DocumentId,
    task_id: &str,
    poll: &TaskPoll,
) -> Vec<Effect> {
    if *poll == TaskPoll::Unreachable {
        docqa_debug!(
            "Task {} for document {} unreachable; retrying next tick",
            task_id,
            document_id
        );
    }
    match state.tasks_mut().apply(document_id, task_id, poll) {
        PollApplied::Unchanged => Vec::new(),
        PollApplied::Removed { now_empty } => {
            docqa_info!("Task {} for document {} resolved: {:?}", task_id, document_id, poll);
            state.mark_dirty();
            let mut effects = vec![Effect::RefreshDocuments];
            if now_empty && state.is_task_polling() {
                state.set_task_polling(false);
                effects.push(Effect::StopTaskPolling);
            }
            effects
        }
    }
}

fn submit_question(state: &mut AppState, raw: &str) -> Vec<Effect> {
    let question = raw.trim();
    if question.is_empty() {
        return Vec::new();
    }
    if state.registry().any_ingesting() {
        return state.notify("Please wait - documents still processing", NoticeKind::Info);
    }
    if !state.in_flight_mut().begin(RequestKind::Ask) {
        docqa_debug!("Ask already in flight; ignoring question");
        return Vec::new();
    }

    state.transcript_mut().push(Turn::user(question));
    state.mark_dirty();
    let selected = state.selection().ids();
    let document_ids = if selected.is_empty() {
        None
    } else {
        Some(selected.iter().copied().collect())
    };
    vec![Effect::Ask {
        question: question.to_string(),
        document_ids,
    }]
}

fn apply_answer(state: &mut AppState, result: Result<Answer, String>) -> Vec<Effect> {
    let current = state.in_flight_mut().finish(RequestKind::Ask);
    state.mark_dirty();
    if !current {
        docqa_info!("Dropping ask reply for a transcript cleared by reset");
        return Vec::new();
    }
    match result {
        Ok(answer) => {
            state.set_active_answer_documents(answer.document_ids_used.clone());
            state.transcript_mut().push(Turn::answer(answer));
            Vec::new()
        }
        Err(err) => {
            docqa_warn!("Ask failed: {}", err);
            state.transcript_mut().push(Turn::ask_failed());
            state.notify("Ask failed", NoticeKind::Error)
        }
    }
}

fn request_summary(state: &mut AppState) -> Vec<Effect> {
    if state.in_flight().is_busy(RequestKind::Summarize) {
        docqa_debug!("Summarize already in flight; ignoring request");
        return Vec::new();
    }
    let readiness = state.summarize_readiness();
    if let Some(reason) = readiness.refusal_message() {
        return state.notify(reason, NoticeKind::Info);
    }
    let crate::SummarizeReadiness::Ready(document_id) = readiness else {
        return Vec::new();
    };
    state.in_flight_mut().begin(RequestKind::Summarize);
    state.mark_dirty();
    vec![Effect::Summarize { document_id }]
}

fn apply_summary(
    state: &mut AppState,
    document_id: DocumentId,
    result: Result<Answer, String>,
) -> Vec<Effect> {
    let current = state.in_flight_mut().finish(RequestKind::Summarize);
    state.mark_dirty();
    if !current {
        docqa_info!("Dropping summary of document {} cleared by reset", document_id);
        return Vec::new();
    }
    match result {
        Ok(answer) => {
            state.transcript_mut().push(Turn::summary(answer));
            Vec::new()
        }
        Err(err) => {
            docqa_warn!("Summarize of document {} failed: {}", document_id, err);
            state.notify("Summarize failed", NoticeKind::Error)
        }
    }
}

fn answer_confirmation(state: &mut AppState, confirmed: bool) -> Vec<Effect> {
    let Some(pending) = state.take_pending_confirmation() else {
        return Vec::new();
    };
    state.mark_dirty();
    if !confirmed {
        docqa_debug!("Confirmation for {:?} declined", pending);
        return Vec::new();
    }
    match pending {
        PendingConfirmation::Delete(document_id) => vec![Effect::DeleteDocument { document_id }],
        PendingConfirmation::Reset => {
            if state.in_flight_mut().begin(RequestKind::Reset) {
                vec![Effect::Reset]
            } else {
                docqa_debug!("Reset already in flight; ignoring confirmation");
                Vec::new()
            }
        }
    }
}

fn apply_reset(state: &mut AppState, result: Result<ResetReport, String>) -> Vec<Effect> {
    state.in_flight_mut().finish(RequestKind::Reset);
    state.mark_dirty();
    let report = match result {
        Ok(report) => report,
        Err(err) => {
            docqa_warn!("Reset failed: {}", err);
            return state.notify("Reset failed", NoticeKind::Error);
        }
    };

    state.clear_after_reset();
    let mut effects = Vec::new();
    if state.is_task_polling() {
        state.set_task_polling(false);
        effects.push(Effect::StopTaskPolling);
    }
    match report.outcome() {
        ResetOutcome::Verified => {
            docqa_info!("Reset verified: indexes empty");
            effects.extend(state.notify("Pipeline fully reset", NoticeKind::Success));
        }
        ResetOutcome::Unverified => {
            docqa_warn!("Reset unverified: {:?}", report);
            effects.extend(state.notify("Reset partial - check backend logs", NoticeKind::Info));
        }
    }
    effects.push(Effect::RefreshDocuments);
    effects.push(Effect::FetchDiagnostics);
    effects
}
