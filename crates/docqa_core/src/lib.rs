//! DocQA core: pure session state machine and view-model helpers.
mod cadence;
mod config;
mod conversation;
mod effect;
mod monitor;
mod msg;
mod notice;
mod outcome;
mod registry;
mod selection;
mod state;
mod tasks;
mod update;
mod view_model;

pub use cadence::{desired_cadence, Cadence, CadenceControl};
pub use config::SessionConfig;
pub use conversation::{
    Answer, AnswerType, InFlight, RequestKind, Role, Transcript, Turn, ASK_FAILED_MESSAGE,
};
pub use effect::Effect;
pub use monitor::{CredentialStatus, Diagnostics, HealthSnapshot, Monitor};
pub use msg::Msg;
pub use notice::{Notice, NoticeId, NoticeKind, Notices, DEFAULT_NOTICE_TTL_MS};
pub use outcome::{CredentialAction, ResetOutcome, ResetReport, UploadReceipt};
pub use registry::{Document, DocumentId, DocumentRegistry, DocumentStatus};
pub use selection::Selection;
pub use state::{AppState, PendingConfirmation, SessionState, SummarizeReadiness};
pub use tasks::{is_trackable_task_id, PollApplied, TaskPoll, TaskResolution, TaskTracker};
pub use update::update;
pub use view_model::{AppViewModel, DocumentRowView};
