use std::collections::BTreeMap;

use crate::DocumentId;

/// Task ids the backend returns when a document was processed synchronously.
const SYNC_TASK_IDS: [&str; 2] = ["sync", "inline"];

/// Whether an upload's task id needs polling at all.
pub fn is_trackable_task_id(task_id: &str) -> bool {
    let task_id = task_id.trim();
    !task_id.is_empty() && !SYNC_TASK_IDS.contains(&task_id)
}

/// Result of one status poll for a tracked task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPoll {
    /// Still pending/started on the backend.
    Pending,
    /// The task reached a terminal state.
    Resolved(TaskResolution),
    /// The poll itself failed (network, 5xx). Retried on the next tick.
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResolution {
    /// Any status other than pending/started, as reported.
    Finished(String),
    /// The backend no longer knows the task.
    NotFound,
}

impl TaskPoll {
    /// Classifies a raw backend task status.
    pub fn from_status(status: &str) -> Self {
        let normalized = status.trim();
        if normalized.eq_ignore_ascii_case("pending") || normalized.eq_ignore_ascii_case("started")
        {
            TaskPoll::Pending
        } else {
            TaskPoll::Resolved(TaskResolution::Finished(normalized.to_string()))
        }
    }
}

/// Outcome of folding a poll result into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollApplied {
    /// Nothing changed (still pending, transient failure, or stale task id).
    Unchanged,
    /// The task was removed; `now_empty` tells whether polling can stop.
    Removed { now_empty: bool },
}

/// Backend async tasks keyed by the document they belong to.
///
/// At most one task per document: a newer registration supersedes the old one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskTracker {
    pending: BTreeMap<DocumentId, String>,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the task for `document_id`.
    /// Returns `true` when this registration took the tracker from empty to non-empty.
    pub fn register(&mut self, document_id: DocumentId, task_id: impl Into<String>) -> bool {
        let was_empty = self.pending.is_empty();
        self.pending.insert(document_id, task_id.into());
        was_empty
    }

    pub fn apply(&mut self, document_id: DocumentId, task_id: &str, poll: &TaskPoll) -> PollApplied {
        match poll {
            TaskPoll::Pending | TaskPoll::Unreachable => PollApplied::Unchanged,
            TaskPoll::Resolved(_) => {
                if self.pending.get(&document_id).map(String::as_str) != Some(task_id) {
                    return PollApplied::Unchanged;
                }
                self.pending.remove(&document_id);
                PollApplied::Removed {
                    now_empty: self.pending.is_empty(),
                }
            }
        }
    }

    pub fn task_for(&self, document_id: DocumentId) -> Option<&str> {
        self.pending.get(&document_id).map(String::as_str)
    }

    pub fn pending(&self) -> impl Iterator<Item = (DocumentId, &str)> {
        self.pending.iter().map(|(id, task)| (*id, task.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
