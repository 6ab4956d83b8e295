use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type DocumentId = i64;

/// Ingestion stage as the backend spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStage {
    Uploaded,
    Downloading,
    Parsing,
    Chunking,
    Embedding,
    Indexing,
    Ingested,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub filename: String,
    pub status: IngestStage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReply {
    pub document_id: DocumentId,
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskStatusReply {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_ids: Option<Vec<DocumentId>>,
}

/// Shared shape of `/ask` and `/summarize/{id}` replies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerReply {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub answer_type: Option<String>,
    #[serde(default)]
    pub document_ids_used: Vec<DocumentId>,
    #[serde(default)]
    pub embed_mode: Option<String>,
    #[serde(default)]
    pub generation_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReply {
    pub status: String,
    #[serde(default)]
    pub components: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CredentialReply {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiagnosticsReply {
    #[serde(default)]
    pub documents_total: u64,
    #[serde(default)]
    pub documents_by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub any_processing: bool,
    #[serde(default, rename = "gemini")]
    pub credential: CredentialReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct RetrievalStats {
    #[serde(default)]
    pub vectors: Option<u64>,
    #[serde(default)]
    pub lexical_chunks: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ResetReply {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub retrieval_stats: Option<RetrievalStats>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOp {
    Set,
    Clear,
}

/// Everything the engine reports back to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    DocumentsFetched(Result<Vec<DocumentRecord>, BackendError>),
    HealthFetched(Result<HealthReply, BackendError>),
    DiagnosticsFetched(Result<DiagnosticsReply, BackendError>),
    UploadFinished {
        filename: String,
        result: Result<UploadReply, BackendError>,
    },
    TaskPolled {
        document_id: DocumentId,
        task_id: String,
        result: Result<TaskStatusReply, BackendError>,
    },
    DocumentDeleted {
        document_id: DocumentId,
        result: Result<(), BackendError>,
    },
    Answered(Result<AnswerReply, BackendError>),
    Summarized {
        document_id: DocumentId,
        result: Result<AnswerReply, BackendError>,
    },
    ResetFinished(Result<ResetReply, BackendError>),
    CredentialChanged {
        op: CredentialOp,
        result: Result<CredentialReply, BackendError>,
    },
    RefreshTick,
    TaskPollTick,
    NoticeExpired { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == FailureKind::HttpStatus(404)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stage_strings_decode_as_unknown() {
        let record: DocumentRecord =
            serde_json::from_str(r#"{"id": 3, "filename": "a.pdf", "status": "ocr"}"#).unwrap();
        assert_eq!(record.status, IngestStage::Unknown);

        let record: DocumentRecord =
            serde_json::from_str(r#"{"id": 3, "filename": "a.pdf", "status": "embedding"}"#)
                .unwrap();
        assert_eq!(record.status, IngestStage::Embedding);
    }

    #[test]
    fn ask_request_omits_empty_scope() {
        let unscoped = AskRequest {
            question: "q".to_string(),
            document_ids: None,
        };
        assert_eq!(
            serde_json::to_value(&unscoped).unwrap(),
            serde_json::json!({"question": "q"})
        );
    }

    #[test]
    fn reset_reply_tolerates_legacy_shape() {
        let reply: ResetReply =
            serde_json::from_str(r#"{"status": "reset", "message": "All stores cleared"}"#)
                .unwrap();
        assert_eq!(reply.success, None);
        assert_eq!(reply.retrieval_stats, None);
    }
}
