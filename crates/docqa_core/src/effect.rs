use std::path::PathBuf;
use std::time::Duration;

use crate::{DocumentId, NoticeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RefreshDocuments,
    FetchHealth,
    FetchDiagnostics,
    /// Restart the single refresh timer with a new period.
    SetRefreshCadence { period: Duration },
    StartTaskPolling { period: Duration },
    StopTaskPolling,
    /// Session teardown: cancel every timer.
    StopTimers,
    PollTask {
        document_id: DocumentId,
        task_id: String,
    },
    UploadFile { path: PathBuf },
    DeleteDocument { document_id: DocumentId },
    Ask {
        question: String,
        document_ids: Option<Vec<DocumentId>>,
    },
    Summarize { document_id: DocumentId },
    Reset,
    SetCredential { key: String },
    ClearCredential,
    ExpireNotice { id: NoticeId, after: Duration },
}
