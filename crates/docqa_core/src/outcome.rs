use crate::DocumentId;

/// What the backend returned for an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub document_id: DocumentId,
    pub task_id: String,
}

/// Post-conditions reported by the backend after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetReport {
    pub success: bool,
    pub vectors: Option<u64>,
    pub lexical_chunks: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Backend confirmed both indexes are empty.
    Verified,
    /// Reset ran but emptiness was not confirmed.
    Unverified,
}

impl ResetReport {
    pub fn outcome(&self) -> ResetOutcome {
        if self.success && self.vectors == Some(0) && self.lexical_chunks == Some(0) {
            ResetOutcome::Verified
        } else {
            ResetOutcome::Unverified
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialAction {
    Set,
    Clear,
}
