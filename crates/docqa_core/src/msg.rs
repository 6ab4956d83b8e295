use std::path::PathBuf;

use crate::{
    Answer, CredentialAction, Diagnostics, Document, DocumentId, HealthSnapshot, NoticeId,
    ResetReport, TaskPoll, UploadReceipt,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session opened: pull everything once and arm the refresh timer.
    SessionStarted,
    /// Session closing: tear down every timer. Later messages are ignored.
    SessionEnded,
    /// Registry/diagnostics refresh timer fired.
    RefreshTick,
    /// Task poll timer fired.
    TaskPollTick,
    /// Backend document list arrived.
    DocumentsLoaded(Vec<Document>),
    HealthLoaded(HealthSnapshot),
    DiagnosticsLoaded(Diagnostics),
    /// User picked a local file to upload.
    UploadRequested { path: PathBuf },
    UploadCompleted {
        filename: String,
        result: Result<UploadReceipt, String>,
    },
    /// One task status poll finished.
    TaskPolled {
        document_id: DocumentId,
        task_id: String,
        poll: TaskPoll,
    },
    /// User clicked a document in the sidebar.
    SelectionToggled(DocumentId),
    /// User submitted a question.
    QuestionSubmitted(String),
    AskCompleted(Result<Answer, String>),
    /// User clicked Summarize.
    SummarizeClicked,
    SummaryCompleted {
        document_id: DocumentId,
        result: Result<Answer, String>,
    },
    /// User asked to delete a document; needs confirmation.
    DeleteClicked(DocumentId),
    DeleteCompleted {
        document_id: DocumentId,
        result: Result<(), String>,
    },
    /// User asked to reset everything; needs confirmation.
    ResetClicked,
    /// User answered the pending confirmation prompt.
    ConfirmationAnswered(bool),
    ResetCompleted(Result<ResetReport, String>),
    /// User entered an external generation key.
    CredentialSubmitted(String),
    CredentialClearRequested,
    CredentialUpdated {
        action: CredentialAction,
        result: Result<(), String>,
    },
    NoticeDismissed(NoticeId),
    NoticeExpired(NoticeId),
    /// UI/render tick to coalesce rendering.
    Tick,
}
