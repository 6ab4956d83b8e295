use std::collections::BTreeSet;
use std::sync::Once;

use docqa_core::{
    update, Answer, AnswerType, AppState, Document, DocumentId, DocumentStatus, Effect, Msg,
    NoticeKind, Role, SummarizeReadiness, ASK_FAILED_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docqa_logging::initialize_for_tests);
}

fn doc(id: DocumentId, status: DocumentStatus) -> Document {
    Document {
        id,
        filename: format!("doc-{id}.pdf"),
        status,
    }
}

fn with_documents(documents: Vec<Document>) -> AppState {
    update(AppState::new(), Msg::DocumentsLoaded(documents)).0
}

fn answer(text: &str, used: &[DocumentId]) -> Answer {
    Answer {
        text: text.to_string(),
        sources: vec!["doc-1.pdf p.2".to_string()],
        answer_type: AnswerType::Factual,
        document_ids_used: used.iter().copied().collect(),
        embed_mode: Some("local".to_string()),
        generation_mode: Some("gemini".to_string()),
    }
}

fn ask(state: AppState, question: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::QuestionSubmitted(question.to_string()))
}

#[test]
fn ask_is_refused_while_anything_ingests() {
    init_logging();
    let state = with_documents(vec![
        doc(1, DocumentStatus::Ingested),
        doc(2, DocumentStatus::Chunking),
    ]);

    let (state, effects) = ask(state, "What is in the report?");

    assert!(!effects.iter().any(|effect| matches!(effect, Effect::Ask { .. })));
    assert!(state.transcript().is_empty());
    assert_eq!(
        state.notices().entries()[0].message,
        "Please wait - documents still processing"
    );
    assert_eq!(state.notices().entries()[0].kind, NoticeKind::Info);
}

#[test]
fn blank_question_is_ignored() {
    init_logging();
    let state = with_documents(vec![doc(1, DocumentStatus::Ingested)]);
    let (state, effects) = ask(state, "   \n ");
    assert!(effects.is_empty());
    assert!(state.transcript().is_empty());
    assert!(state.notices().is_empty());
}

#[test]
fn ask_appends_user_turn_before_the_response() {
    init_logging();
    let state = with_documents(vec![doc(1, DocumentStatus::Ingested)]);
    let (state, effects) = ask(state, "  Who signed it?  ");

    assert_eq!(
        effects,
        vec![Effect::Ask {
            question: "Who signed it?".to_string(),
            document_ids: None,
        }]
    );
    let turns = state.transcript().turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "Who signed it?");
    assert!(state.view().asking);
}

#[test]
fn ask_is_scoped_to_the_selection() {
    init_logging();
    let state = with_documents(vec![
        doc(1, DocumentStatus::Ingested),
        doc(2, DocumentStatus::Ingested),
        doc(3, DocumentStatus::Ingested),
    ]);
    let (state, _) = update(state, Msg::SelectionToggled(3));
    let (state, _) = update(state, Msg::SelectionToggled(1));

    let (_state, effects) = ask(state, "compare them");
    assert_eq!(
        effects,
        vec![Effect::Ask {
            question: "compare them".to_string(),
            document_ids: Some(vec![1, 3]),
        }]
    );
}

#[test]
fn second_ask_while_in_flight_is_rejected() {
    init_logging();
    let state = with_documents(vec![doc(1, DocumentStatus::Ingested)]);
    let (state, _) = ask(state, "first");
    let (state, effects) = ask(state, "second");

    assert!(effects.is_empty());
    assert_eq!(state.transcript().len(), 1);
}

#[test]
fn successful_answer_records_metadata_and_replaces_active_documents() {
    init_logging();
    let state = with_documents(vec![
        doc(1, DocumentStatus::Ingested),
        doc(2, DocumentStatus::Ingested),
    ]);
    let (state, _) = ask(state, "q1");
    let (state, _) = update(state, Msg::AskCompleted(Ok(answer("a1", &[1, 2]))));
    assert_eq!(
        state.active_answer_documents(),
        &[1, 2].into_iter().collect::<BTreeSet<_>>()
    );

    let (state, _) = ask(state, "q2");
    let (state, effects) = update(state, Msg::AskCompleted(Ok(answer("a2", &[2]))));
    assert!(effects.is_empty());
    assert_eq!(
        state.active_answer_documents(),
        &[2].into_iter().collect::<BTreeSet<_>>()
    );

    let last = state.transcript().turns().last().unwrap().clone();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "a2");
    assert_eq!(last.answer_type, Some(AnswerType::Factual));
    assert_eq!(last.embed_mode.as_deref(), Some("local"));
    assert_eq!(last.generation_mode.as_deref(), Some("gemini"));
    assert_eq!(last.sources, vec!["doc-1.pdf p.2".to_string()]);

    let view = state.view();
    assert!(!view.asking);
    assert!(!view.documents[0].used_in_answer);
    assert!(view.documents[1].used_in_answer);
}

#[test]
fn failed_ask_records_error_turn_and_notice() {
    init_logging();
    let state = with_documents(vec![doc(1, DocumentStatus::Ingested)]);
    let (state, _) = ask(state, "q");
    let (state, _) = update(state, Msg::AskCompleted(Ok(answer("a", &[1]))));
    let (state, _) = ask(state, "q again");
    let (state, effects) = update(state, Msg::AskCompleted(Err("500".to_string())));

    let last = state.transcript().turns().last().unwrap();
    assert!(last.is_error());
    assert_eq!(last.answer_type, Some(AnswerType::RequestFailed));
    assert_eq!(last.content, ASK_FAILED_MESSAGE);
    assert_eq!(state.notices().entries()[0].message, "Ask failed");
    assert_eq!(state.notices().entries()[0].kind, NoticeKind::Error);
    assert!(matches!(effects.as_slice(), [Effect::ExpireNotice { .. }]));
    // The previous answer's documents stay highlighted.
    assert!(state.active_answer_documents().contains(&1));
    assert!(!state.view().asking);
}

#[test]
fn transcript_round_trips_pairs_in_order() {
    init_logging();
    let mut state = with_documents(vec![doc(1, DocumentStatus::Ingested)]);
    for i in 0..5 {
        state = ask(state, &format!("question {i}")).0;
        state = update(state, Msg::AskCompleted(Ok(answer(&format!("answer {i}"), &[1])))).0;
    }

    let turns = state.transcript().turns();
    assert_eq!(turns.len(), 10);
    for (i, pair) in turns.chunks(2).enumerate() {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[0].content, format!("question {i}"));
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[1].content, format!("answer {i}"));
    }
}

#[test]
fn summarize_is_noop_without_single_ready_selection() {
    init_logging();
    let state = with_documents(vec![
        doc(1, DocumentStatus::Ingested),
        doc(2, DocumentStatus::Indexing),
        doc(3, DocumentStatus::Ingested),
    ]);

    // Nothing selected.
    let (state, effects) = update(state, Msg::SummarizeClicked);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Summarize { .. })));
    assert_eq!(
        state.notices().entries().last().unwrap().message,
        "Select a document to summarize"
    );

    // Two selected.
    let (state, _) = update(state, Msg::SelectionToggled(1));
    let (state, _) = update(state, Msg::SelectionToggled(3));
    assert_eq!(state.view().summarize, SummarizeReadiness::MultipleSelected);
    let (state, effects) = update(state, Msg::SummarizeClicked);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Summarize { .. })));
    assert_eq!(
        state.notices().entries().last().unwrap().message,
        "Select exactly one document"
    );

    // One selected, still ingesting.
    let (state, _) = update(state, Msg::SelectionToggled(1));
    let (state, _) = update(state, Msg::SelectionToggled(3));
    let (state, _) = update(state, Msg::SelectionToggled(2));
    assert_eq!(state.view().summarize, SummarizeReadiness::NotReady);
    let (state, effects) = update(state, Msg::SummarizeClicked);
    assert!(!effects.iter().any(|e| matches!(e, Effect::Summarize { .. })));
    assert_eq!(
        state.notices().entries().last().unwrap().message,
        "Document still ingesting"
    );

    assert!(state.transcript().is_empty());
    assert!(!state.view().summarizing);
}

#[test]
fn summarize_appends_assistant_turn_only() {
    init_logging();
    let state = with_documents(vec![doc(4, DocumentStatus::Ingested)]);
    let (state, _) = update(state, Msg::SelectionToggled(4));
    let (state, effects) = update(state, Msg::SummarizeClicked);
    assert_eq!(effects, vec![Effect::Summarize { document_id: 4 }]);
    assert!(state.transcript().is_empty());

    let (state, effects) = update(state, Msg::SummarizeClicked);
    assert!(effects.is_empty());

    let summary = Answer {
        answer_type: AnswerType::Summarization,
        ..answer("short summary", &[4])
    };
    let (state, _) = update(
        state,
        Msg::SummaryCompleted {
            document_id: 4,
            result: Ok(summary),
        },
    );
    let turns = state.transcript().turns();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].role, Role::Assistant);
    assert_eq!(turns[0].answer_type, Some(AnswerType::Summarization));
    assert_eq!(turns[0].document_ids_used, None);
    assert!(state.active_answer_documents().is_empty());
}

#[test]
fn summarize_failure_only_notifies() {
    init_logging();
    let state = with_documents(vec![doc(4, DocumentStatus::Ingested)]);
    let (state, _) = update(state, Msg::SelectionToggled(4));
    let (state, _) = update(state, Msg::SummarizeClicked);
    let (state, _) = update(
        state,
        Msg::SummaryCompleted {
            document_id: 4,
            result: Err("404".to_string()),
        },
    );
    assert!(state.transcript().is_empty());
    assert_eq!(state.notices().entries()[0].message, "Summarize failed");
    assert!(!state.view().summarizing);
}

#[test]
fn ask_and_summarize_do_not_block_each_other() {
    init_logging();
    let state = with_documents(vec![doc(1, DocumentStatus::Ingested)]);
    let (state, _) = update(state, Msg::SelectionToggled(1));
    let (state, ask_effects) = ask(state, "q");
    let (state, summary_effects) = update(state, Msg::SummarizeClicked);

    assert!(matches!(ask_effects.as_slice(), [Effect::Ask { .. }]));
    assert_eq!(summary_effects, vec![Effect::Summarize { document_id: 1 }]);
    let view = state.view();
    assert!(view.asking);
    assert!(view.summarizing);
}
