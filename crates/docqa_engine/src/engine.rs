use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docqa_logging::{docqa_debug, docqa_info, docqa_warn};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Runtime;

use crate::client::{Backend, ClientSettings, ReqwestBackend};
use crate::scheduler::{ChannelEventSink, EventSink, Timers};
use crate::upload::{file_name_of, UploadFile};
use crate::{
    AskRequest, BackendError, CredentialOp, DocumentId, EngineEvent, FailureKind, UploadReply,
};

const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// One ingestion task to check on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub document_id: DocumentId,
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    FetchDocuments,
    FetchHealth,
    FetchDiagnostics,
    Upload { path: PathBuf },
    /// Polls every listed task concurrently; each `TaskPolled` event is emitted
    /// as soon as its own poll settles.
    PollTasks(Vec<TaskRef>),
    DeleteDocument { document_id: DocumentId },
    Ask(AskRequest),
    Summarize { document_id: DocumentId },
    Reset,
    SetCredential { key: String },
    ClearCredential,
    SetRefreshPeriod(Duration),
    StartTaskPolling(Duration),
    StopTaskPolling,
    ExpireNotice { id: String, after: Duration },
    StopTimers,
    Shutdown,
}

/// Sending half of the engine. Cloning shares the same engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<(Self, EngineEvents), BackendError> {
        let backend = ReqwestBackend::new(settings)?;
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
    ) -> Result<(Self, EngineEvents), BackendError> {
        let runtime =
            Runtime::new().map_err(|err| BackendError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run(runtime, backend, cmd_rx, event_tx));

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    /// Returns false once the engine thread has gone away.
    pub fn send(&self, command: EngineCommand) -> bool {
        self.cmd_tx.send(command).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

impl EngineEvents {
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn run(
    runtime: Runtime,
    backend: Arc<dyn Backend>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
    let mut timers = Timers::new(runtime.handle().clone(), sink.clone());

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::SetRefreshPeriod(period) => {
                timers.restart_refresh(period);
            }
            EngineCommand::StartTaskPolling(period) => timers.start_task_polling(period),
            EngineCommand::StopTaskPolling => timers.stop_task_polling(),
            EngineCommand::ExpireNotice { id, after } => timers.expire_notice_after(id, after),
            EngineCommand::StopTimers => timers.shutdown(),
            EngineCommand::Shutdown => break,
            command => {
                let backend = backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    execute(backend.as_ref(), command, sink.as_ref()).await;
                });
            }
        }
    }

    docqa_info!(
        "engine stopping after {} refresh timer restarts",
        timers.refresh_restarts()
    );
    timers.shutdown();
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
}

async fn execute(backend: &dyn Backend, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::FetchDocuments => {
            sink.emit(EngineEvent::DocumentsFetched(backend.list_documents().await));
        }
        EngineCommand::FetchHealth => {
            sink.emit(EngineEvent::HealthFetched(backend.health().await));
        }
        EngineCommand::FetchDiagnostics => {
            sink.emit(EngineEvent::DiagnosticsFetched(backend.diagnostics().await));
        }
        EngineCommand::Upload { path } => {
            let (filename, result) = upload(backend, &path).await;
            sink.emit(EngineEvent::UploadFinished { filename, result });
        }
        EngineCommand::PollTasks(tasks) => {
            let mut polls = tasks
                .into_iter()
                .map(|task| async move {
                    let result = backend.task_status(&task.task_id).await;
                    EngineEvent::TaskPolled {
                        document_id: task.document_id,
                        task_id: task.task_id,
                        result,
                    }
                })
                .collect::<FuturesUnordered<_>>();
            while let Some(event) = polls.next().await {
                sink.emit(event);
            }
        }
        EngineCommand::DeleteDocument { document_id } => {
            let result = backend.delete_document(document_id).await;
            sink.emit(EngineEvent::DocumentDeleted {
                document_id,
                result,
            });
        }
        EngineCommand::Ask(request) => {
            docqa_debug!(
                "ask question_len={} scoped={}",
                request.question.len(),
                request.document_ids.is_some()
            );
            sink.emit(EngineEvent::Answered(backend.ask(&request).await));
        }
        EngineCommand::Summarize { document_id } => {
            let result = backend.summarize(document_id).await;
            sink.emit(EngineEvent::Summarized {
                document_id,
                result,
            });
        }
        EngineCommand::Reset => {
            sink.emit(EngineEvent::ResetFinished(backend.reset().await));
        }
        EngineCommand::SetCredential { key } => {
            let result = backend.set_credential(&key).await;
            sink.emit(EngineEvent::CredentialChanged {
                op: CredentialOp::Set,
                result,
            });
        }
        EngineCommand::ClearCredential => {
            let result = backend.clear_credential().await;
            sink.emit(EngineEvent::CredentialChanged {
                op: CredentialOp::Clear,
                result,
            });
        }
        EngineCommand::SetRefreshPeriod(_)
        | EngineCommand::StartTaskPolling(_)
        | EngineCommand::StopTaskPolling
        | EngineCommand::ExpireNotice { .. }
        | EngineCommand::StopTimers
        | EngineCommand::Shutdown => {
            docqa_warn!("timer command reached the I/O executor");
        }
    }
}

async fn upload(
    backend: &dyn Backend,
    path: &Path,
) -> (String, Result<UploadReply, BackendError>) {
    let fallback_name = file_name_of(path).unwrap_or_else(|_| path.display().to_string());
    let file = match UploadFile::from_path(path).await {
        Ok(file) => file,
        Err(err) => {
            docqa_warn!("upload of {} not sent: {}", fallback_name, err);
            return (
                fallback_name,
                Err(BackendError::new(FailureKind::Io, err.to_string())),
            );
        }
    };
    let filename = file.filename.clone();
    docqa_info!("uploading {} ({} bytes)", filename, file.content.len());
    (filename, backend.upload(file).await)
}
