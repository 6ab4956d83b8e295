use std::collections::BTreeSet;

use docqa_core::{
    AppViewModel, DocumentRowView, NoticeKind, PendingConfirmation, Role, SessionState,
    SummarizeReadiness, Turn,
};

/// Prints only what changed since the previous render.
///
/// Transcript turns are appended, never reprinted; a shrinking transcript
/// means a reset cleared it.
#[derive(Debug, Default)]
pub struct Renderer {
    printed_turns: usize,
    transcript_revision: u64,
    seen_notices: BTreeSet<String>,
    last_status: String,
    last_documents: Vec<DocumentRowView>,
    last_prompt: Option<PendingConfirmation>,
}

impl Renderer {
    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        let status = status_line(view);
        if status != self.last_status {
            lines.push(status.clone());
            self.last_status = status;
        }

        if view.documents != self.last_documents {
            lines.extend(document_lines(&view.documents));
            self.last_documents = view.documents.clone();
        }

        if view.transcript_revision != self.transcript_revision {
            if view.transcript.len() < self.printed_turns {
                lines.push("-- conversation cleared --".to_string());
                self.printed_turns = 0;
            }
            for turn in &view.transcript[self.printed_turns..] {
                lines.extend(turn_lines(turn));
            }
            self.printed_turns = view.transcript.len();
            self.transcript_revision = view.transcript_revision;
        }

        let live: BTreeSet<String> = view.notices.iter().map(|n| n.id.clone()).collect();
        for notice in &view.notices {
            if !self.seen_notices.contains(&notice.id) {
                lines.push(format!(
                    "[{}] {}  (dismiss {})",
                    notice_tag(notice.kind),
                    notice.message,
                    notice.id
                ));
            }
        }
        self.seen_notices = live;

        if view.pending_confirmation != self.last_prompt {
            if let Some(pending) = view.pending_confirmation {
                lines.push(confirmation_prompt(pending, view));
            }
            self.last_prompt = view.pending_confirmation;
        }

        lines
    }

    /// Forgets what was printed and renders the whole view.
    pub fn render_full(&mut self, view: &AppViewModel) -> Vec<String> {
        *self = Self::default();
        let mut lines = self.render(view);
        if view.documents.is_empty() {
            lines.push("  (no documents)".to_string());
        }
        lines.push(summarize_line(view.summarize));
        if let Some(health) = &view.health {
            for (component, state) in &health.components {
                lines.push(format!("  {component}: {state}"));
            }
        }
        if let Some(credential) = &view.credential {
            if let Some(err) = &credential.last_error {
                lines.push(format!("  key error: {err}"));
            }
        }
        lines
    }
}

fn status_line(view: &AppViewModel) -> String {
    let session = match view.session {
        SessionState::Idle => "Idle",
        SessionState::Running => "Running",
        SessionState::Ended => "Ended",
    };
    let mut status = format!(
        "Session: {} | Docs: {}/{} ready",
        session, view.ingested_count, view.document_count
    );
    if view.ingesting {
        status.push_str(" (ingesting)");
    }
    if view.pending_task_count > 0 {
        status.push_str(&format!(" | Tasks: {}", view.pending_task_count));
    }
    if view.uploads_in_flight > 0 {
        status.push_str(&format!(" | Uploading: {}", view.uploads_in_flight));
    }
    let health = match &view.health {
        Some(_) if view.health_degraded => "degraded",
        Some(_) => "ok",
        None => "unknown",
    };
    status.push_str(&format!(" | Health: {health}"));
    if let Some(credential) = &view.credential {
        let key = if credential.active { "active" } else { "inactive" };
        status.push_str(&format!(" | Key: {key}"));
    }

    let busy: Vec<&str> = [
        (view.asking, "asking"),
        (view.summarizing, "summarizing"),
        (view.resetting, "resetting"),
    ]
    .into_iter()
    .filter_map(|(on, label)| on.then_some(label))
    .collect();
    if !busy.is_empty() {
        status.push_str(&format!(" | {}...", busy.join(", ")));
    }
    status
}

fn document_lines(rows: &[DocumentRowView]) -> Vec<String> {
    rows.iter().map(format_document_row).collect()
}

fn format_document_row(row: &DocumentRowView) -> String {
    let mark = if row.selected { "[x]" } else { "[ ]" };
    let mut line = format!("  {mark} #{} {} - {}", row.id, row.filename, row.label);
    if row.task_pending {
        line.push_str(" (processing)");
    }
    if row.used_in_answer {
        line.push_str(" *");
    }
    line
}

fn turn_lines(turn: &Turn) -> Vec<String> {
    match turn.role {
        Role::User => vec![format!("> {}", turn.content)],
        Role::Assistant if turn.is_error() => vec![format!("! {}", turn.content)],
        Role::Assistant => {
            let mut lines: Vec<String> = turn.content.lines().map(str::to_string).collect();
            if !turn.sources.is_empty() {
                lines.push(format!("  sources: {}", turn.sources.join(", ")));
            }
            let meta = turn_meta(turn);
            if !meta.is_empty() {
                lines.push(format!("  [{}]", meta.join(" | ")));
            }
            lines
        }
    }
}

fn turn_meta(turn: &Turn) -> Vec<String> {
    let mut meta = Vec::new();
    if let Some(answer_type) = &turn.answer_type {
        if !answer_type.as_str().is_empty() {
            meta.push(answer_type.as_str().to_string());
        }
    }
    if let Some(ids) = &turn.document_ids_used {
        if !ids.is_empty() {
            let ids: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
            meta.push(format!("docs {}", ids.join(",")));
        }
    }
    if let Some(mode) = &turn.embed_mode {
        meta.push(format!("embed {mode}"));
    }
    if let Some(mode) = &turn.generation_mode {
        meta.push(format!("gen {mode}"));
    }
    meta
}

fn notice_tag(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Info => "info",
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
    }
}

fn confirmation_prompt(pending: PendingConfirmation, view: &AppViewModel) -> String {
    match pending {
        PendingConfirmation::Reset => {
            "Reset deletes every document, index and the API key. Type yes or no.".to_string()
        }
        PendingConfirmation::Delete(id) => {
            let name = view
                .documents
                .iter()
                .find(|row| row.id == id)
                .map(|row| row.filename.as_str())
                .unwrap_or("?");
            format!("Delete #{id} ({name})? Type yes or no.")
        }
    }
}

fn summarize_line(readiness: SummarizeReadiness) -> String {
    match readiness {
        SummarizeReadiness::Ready(id) => format!("Summarize: ready for #{id}"),
        other => format!("Summarize: {}", other.refusal_message().unwrap_or("unavailable")),
    }
}
