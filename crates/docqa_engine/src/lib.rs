//! Docqa engine: backend client, timers and effect execution.
mod client;
mod engine;
mod scheduler;
mod types;
mod upload;

pub use client::{parse_base_url, Backend, ClientSettings, ReqwestBackend};
pub use engine::{EngineCommand, EngineEvents, EngineHandle, TaskRef};
pub use scheduler::{ChannelEventSink, EventSink, Timers};
pub use types::{
    AnswerReply, AskRequest, BackendError, CredentialOp, CredentialReply, DiagnosticsReply,
    DocumentId, DocumentRecord, EngineEvent, FailureKind, HealthReply, IngestStage, ResetReply,
    RetrievalStats, TaskStatusReply, UploadReply,
};
pub use upload::{file_name_of, guess_content_type, UploadError, UploadFile};
