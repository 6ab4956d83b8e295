use std::collections::BTreeSet;

use crate::DocumentId;

/// Content of the assistant turn recorded when an ask request fails.
pub const ASK_FAILED_MESSAGE: &str = "Error: unable to get answer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Classification of an answer as reported by the backend.
///
/// `RequestFailed` is never sent by the backend; it marks turns recorded
/// locally because the request itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerType {
    Factual,
    Contextual,
    Analytical,
    Descriptive,
    Summarization,
    OutOfScope,
    RequestFailed,
    Other(String),
}

impl AnswerType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "factual" => AnswerType::Factual,
            "contextual" => AnswerType::Contextual,
            "analytical" => AnswerType::Analytical,
            "descriptive" => AnswerType::Descriptive,
            "summarization" => AnswerType::Summarization,
            "out_of_scope" => AnswerType::OutOfScope,
            other => AnswerType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AnswerType::Factual => "factual",
            AnswerType::Contextual => "contextual",
            AnswerType::Analytical => "analytical",
            AnswerType::Descriptive => "descriptive",
            AnswerType::Summarization => "summarization",
            AnswerType::OutOfScope => "out_of_scope",
            AnswerType::RequestFailed => "request_failed",
            AnswerType::Other(raw) => raw,
        }
    }
}

/// A successful answer (or summary) returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
    pub answer_type: AnswerType,
    pub document_ids_used: BTreeSet<DocumentId>,
    pub embed_mode: Option<String>,
    pub generation_mode: Option<String>,
}

/// One entry of the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub sources: Vec<String>,
    pub answer_type: Option<AnswerType>,
    pub document_ids_used: Option<BTreeSet<DocumentId>>,
    pub embed_mode: Option<String>,
    pub generation_mode: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            answer_type: None,
            document_ids_used: None,
            embed_mode: None,
            generation_mode: None,
        }
    }

    pub fn answer(answer: Answer) -> Self {
        Self {
            role: Role::Assistant,
            content: answer.text,
            sources: answer.sources,
            answer_type: Some(answer.answer_type),
            document_ids_used: Some(answer.document_ids_used),
            embed_mode: answer.embed_mode,
            generation_mode: answer.generation_mode,
        }
    }

    /// Summaries only carry their sources and answer type.
    pub fn summary(answer: Answer) -> Self {
        Self {
            role: Role::Assistant,
            content: answer.text,
            sources: answer.sources,
            answer_type: Some(answer.answer_type),
            document_ids_used: None,
            embed_mode: None,
            generation_mode: None,
        }
    }

    pub fn ask_failed() -> Self {
        Self {
            role: Role::Assistant,
            content: ASK_FAILED_MESSAGE.to_string(),
            sources: Vec::new(),
            answer_type: Some(AnswerType::RequestFailed),
            document_ids_used: None,
            embed_mode: None,
            generation_mode: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.answer_type == Some(AnswerType::RequestFailed)
    }
}

/// Append-only conversation history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.revision += 1;
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Bumped on every change; renderers scroll when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Request types sequenced against the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Ask,
    Summarize,
    Reset,
}

/// In-flight flags, one per request kind.
///
/// Kinds do not block each other; a kind never has two requests in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InFlight {
    ask: Slot,
    summarize: Slot,
    reset: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Slot {
    busy: bool,
    /// The transcript this request was made against has been cleared.
    orphaned: bool,
}

impl InFlight {
    fn slot(&mut self, kind: RequestKind) -> &mut Slot {
        match kind {
            RequestKind::Ask => &mut self.ask,
            RequestKind::Summarize => &mut self.summarize,
            RequestKind::Reset => &mut self.reset,
        }
    }

    /// Marks `kind` in flight. Returns `false` if it already was.
    pub fn begin(&mut self, kind: RequestKind) -> bool {
        let slot = self.slot(kind);
        if slot.busy {
            return false;
        }
        *slot = Slot {
            busy: true,
            orphaned: false,
        };
        true
    }

    /// Clears `kind`. Returns `false` when its reply belongs to a transcript
    /// that was cleared while it was in flight.
    pub fn finish(&mut self, kind: RequestKind) -> bool {
        let slot = self.slot(kind);
        let current = !slot.orphaned;
        *slot = Slot::default();
        current
    }

    /// Marks in-flight ask and summarize requests so their replies are dropped.
    pub fn orphan_transcript_requests(&mut self) {
        for slot in [&mut self.ask, &mut self.summarize] {
            if slot.busy {
                slot.orphaned = true;
            }
        }
    }

    pub fn is_busy(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Ask => self.ask.busy,
            RequestKind::Summarize => self.summarize.busy,
            RequestKind::Reset => self.reset.busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_type_parse_roundtrips_known_values() {
        for raw in [
            "factual",
            "contextual",
            "analytical",
            "descriptive",
            "summarization",
            "out_of_scope",
        ] {
            assert_eq!(AnswerType::parse(raw).as_str(), raw);
        }
        assert_eq!(
            AnswerType::parse("speculative"),
            AnswerType::Other("speculative".to_string())
        );
    }

    #[test]
    fn failed_turn_is_recognisable_without_matching_text() {
        let turn = Turn::ask_failed();
        assert!(turn.is_error());
        assert!(!Turn::user("hi").is_error());
    }

    #[test]
    fn in_flight_is_per_kind() {
        let mut flags = InFlight::default();
        assert!(flags.begin(RequestKind::Ask));
        assert!(!flags.begin(RequestKind::Ask));
        assert!(flags.begin(RequestKind::Summarize));
        flags.finish(RequestKind::Ask);
        assert!(!flags.is_busy(RequestKind::Ask));
        assert!(flags.is_busy(RequestKind::Summarize));
    }

    #[test]
    fn orphaned_request_stays_busy_until_its_reply() {
        let mut flags = InFlight::default();
        flags.begin(RequestKind::Ask);
        flags.orphan_transcript_requests();
        assert!(!flags.begin(RequestKind::Ask));
        assert!(!flags.finish(RequestKind::Ask));

        assert!(flags.begin(RequestKind::Ask));
        assert!(flags.finish(RequestKind::Ask));
    }

    #[test]
    fn revision_moves_on_every_change() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("a"));
        transcript.push(Turn::ask_failed());
        assert_eq!(transcript.revision(), 2);
        transcript.clear();
        assert_eq!(transcript.revision(), 3);
        assert!(transcript.is_empty());
    }
}
