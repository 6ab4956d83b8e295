use std::thread;

use docqa_core::{
    Answer, AnswerType, CredentialAction, CredentialStatus, Diagnostics, Document, DocumentStatus,
    Effect, HealthSnapshot, Msg, ResetReport, TaskPoll, TaskResolution, UploadReceipt,
};
use docqa_engine::{
    AnswerReply, AskRequest, BackendError, ClientSettings, CredentialOp, CredentialReply,
    EngineCommand, EngineEvent, EngineEvents, EngineHandle, IngestStage, ResetReply, TaskRef,
};
use docqa_logging::{docqa_debug, docqa_info, docqa_warn};

/// Turns core effects into engine commands and engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    /// `forward` receives every mapped message and returns false once the
    /// session loop is gone.
    pub fn new<F>(settings: ClientSettings, forward: F) -> Result<Self, BackendError>
    where
        F: Fn(Msg) -> bool + Send + 'static,
    {
        docqa_info!("Connecting to backend at {}", settings.base_url);
        let (engine, events) = EngineHandle::new(settings)?;
        spawn_event_loop(events, forward);
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        let mut polls = Vec::new();
        for effect in effects {
            match effect {
                Effect::PollTask {
                    document_id,
                    task_id,
                } => polls.push(TaskRef {
                    document_id,
                    task_id,
                }),
                effect => {
                    log_effect(&effect);
                    self.engine.send(command_for(effect));
                }
            }
        }
        if !polls.is_empty() {
            docqa_debug!("PollTasks count={}", polls.len());
            self.engine.send(EngineCommand::PollTasks(polls));
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn spawn_event_loop<F>(events: EngineEvents, forward: F)
where
    F: Fn(Msg) -> bool + Send + 'static,
{
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if let Some(msg) = msg_for(event) {
                if !forward(msg) {
                    break;
                }
            }
        }
    });
}

fn log_effect(effect: &Effect) {
    match effect {
        Effect::SetCredential { key } => docqa_debug!("SetCredential key_len={}", key.len()),
        Effect::Ask {
            question,
            document_ids,
        } => docqa_debug!(
            "Ask question_len={} scope={:?}",
            question.len(),
            document_ids
        ),
        other => docqa_debug!("{:?}", other),
    }
}

pub(crate) fn command_for(effect: Effect) -> EngineCommand {
    match effect {
        Effect::RefreshDocuments => EngineCommand::FetchDocuments,
        Effect::FetchHealth => EngineCommand::FetchHealth,
        Effect::FetchDiagnostics => EngineCommand::FetchDiagnostics,
        Effect::SetRefreshCadence { period } => EngineCommand::SetRefreshPeriod(period),
        Effect::StartTaskPolling { period } => EngineCommand::StartTaskPolling(period),
        Effect::StopTaskPolling => EngineCommand::StopTaskPolling,
        Effect::StopTimers => EngineCommand::StopTimers,
        Effect::PollTask {
            document_id,
            task_id,
        } => EngineCommand::PollTasks(vec![TaskRef {
            document_id,
            task_id,
        }]),
        Effect::UploadFile { path } => EngineCommand::Upload { path },
        Effect::DeleteDocument { document_id } => EngineCommand::DeleteDocument { document_id },
        Effect::Ask {
            question,
            document_ids,
        } => EngineCommand::Ask(AskRequest {
            question,
            document_ids,
        }),
        Effect::Summarize { document_id } => EngineCommand::Summarize { document_id },
        Effect::Reset => EngineCommand::Reset,
        Effect::SetCredential { key } => EngineCommand::SetCredential { key },
        Effect::ClearCredential => EngineCommand::ClearCredential,
        Effect::ExpireNotice { id, after } => EngineCommand::ExpireNotice { id, after },
    }
}

/// Pull failures are only logged; the next refresh retries them.
pub(crate) fn msg_for(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::DocumentsFetched(Ok(records)) => Some(Msg::DocumentsLoaded(
            records
                .into_iter()
                .map(|record| Document {
                    id: record.id,
                    filename: record.filename,
                    status: map_stage(record.status),
                })
                .collect(),
        )),
        EngineEvent::DocumentsFetched(Err(err)) => {
            docqa_warn!("Document refresh failed: {}", err);
            None
        }
        EngineEvent::HealthFetched(Ok(reply)) => Some(Msg::HealthLoaded(HealthSnapshot {
            status: reply.status,
            components: reply.components,
        })),
        EngineEvent::HealthFetched(Err(err)) => {
            docqa_warn!("Health check failed: {}", err);
            None
        }
        EngineEvent::DiagnosticsFetched(Ok(reply)) => Some(Msg::DiagnosticsLoaded(Diagnostics {
            documents_total: reply.documents_total,
            documents_by_status: reply.documents_by_status,
            any_processing: reply.any_processing,
            credential: map_credential(reply.credential),
        })),
        EngineEvent::DiagnosticsFetched(Err(err)) => {
            docqa_warn!("Diagnostics refresh failed: {}", err);
            None
        }
        EngineEvent::UploadFinished { filename, result } => Some(Msg::UploadCompleted {
            filename,
            result: result
                .map(|reply| UploadReceipt {
                    document_id: reply.document_id,
                    task_id: reply.task_id,
                })
                .map_err(|err| err.to_string()),
        }),
        EngineEvent::TaskPolled {
            document_id,
            task_id,
            result,
        } => Some(Msg::TaskPolled {
            document_id,
            task_id,
            poll: map_poll(result),
        }),
        EngineEvent::DocumentDeleted {
            document_id,
            result,
        } => Some(Msg::DeleteCompleted {
            document_id,
            result: result.map_err(|err| err.to_string()),
        }),
        EngineEvent::Answered(result) => Some(Msg::AskCompleted(
            result
                .map(|reply| map_answer(reply, AnswerType::Other(String::new())))
                .map_err(|err| err.to_string()),
        )),
        EngineEvent::Summarized {
            document_id,
            result,
        } => Some(Msg::SummaryCompleted {
            document_id,
            result: result
                .map(|reply| map_answer(reply, AnswerType::Summarization))
                .map_err(|err| err.to_string()),
        }),
        EngineEvent::ResetFinished(result) => Some(Msg::ResetCompleted(
            result.map(map_reset).map_err(|err| err.to_string()),
        )),
        EngineEvent::CredentialChanged { op, result } => Some(Msg::CredentialUpdated {
            action: match op {
                CredentialOp::Set => CredentialAction::Set,
                CredentialOp::Clear => CredentialAction::Clear,
            },
            result: result.map(|_| ()).map_err(|err| err.to_string()),
        }),
        EngineEvent::RefreshTick => Some(Msg::RefreshTick),
        EngineEvent::TaskPollTick => Some(Msg::TaskPollTick),
        EngineEvent::NoticeExpired { id } => Some(Msg::NoticeExpired(id)),
    }
}

fn map_poll(result: Result<docqa_engine::TaskStatusReply, BackendError>) -> TaskPoll {
    match result {
        Ok(reply) => TaskPoll::from_status(&reply.status),
        Err(err) if err.is_not_found() => TaskPoll::Resolved(TaskResolution::NotFound),
        Err(err) => {
            docqa_debug!("Task poll unreachable: {}", err);
            TaskPoll::Unreachable
        }
    }
}

fn map_answer(reply: AnswerReply, fallback_type: AnswerType) -> Answer {
    Answer {
        text: reply.answer,
        sources: reply.sources,
        answer_type: reply
            .answer_type
            .as_deref()
            .map(AnswerType::parse)
            .unwrap_or(fallback_type),
        document_ids_used: reply.document_ids_used.into_iter().collect(),
        embed_mode: reply.embed_mode,
        generation_mode: reply.generation_mode,
    }
}

fn map_reset(reply: ResetReply) -> ResetReport {
    let stats = reply.retrieval_stats.unwrap_or_default();
    ResetReport {
        success: reply.success.unwrap_or(false),
        vectors: stats.vectors,
        lexical_chunks: stats.lexical_chunks,
    }
}

fn map_credential(reply: CredentialReply) -> CredentialStatus {
    CredentialStatus {
        active: reply.active,
        last_error: reply.last_error,
    }
}

fn map_stage(stage: IngestStage) -> DocumentStatus {
    match stage {
        IngestStage::Uploaded => DocumentStatus::Uploaded,
        IngestStage::Downloading => DocumentStatus::Downloading,
        IngestStage::Parsing => DocumentStatus::Parsing,
        IngestStage::Chunking => DocumentStatus::Chunking,
        IngestStage::Embedding => DocumentStatus::Embedding,
        IngestStage::Indexing => DocumentStatus::Indexing,
        IngestStage::Ingested => DocumentStatus::Ingested,
        IngestStage::Error => DocumentStatus::Error,
        IngestStage::Unknown => DocumentStatus::Unknown,
    }
}
