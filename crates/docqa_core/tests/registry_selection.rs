use std::collections::BTreeSet;
use std::sync::Once;

use docqa_core::{update, AppState, Document, DocumentId, DocumentStatus, Msg};

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

fn load(state: AppState, documents: Vec<Document>) -> AppState {
    update(state, Msg::DocumentsLoaded(documents)).0
}

fn toggle(state: AppState, id: DocumentId) -> AppState {
    update(state, Msg::SelectionToggled(id)).0
}

/// Small deterministic generator so the sequence is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn selection_stays_within_registry_across_refreshes() {
    init_logging();
    let mut rng = Lcg(42);
    let mut state = AppState::new();

    for _ in 0..200 {
        let documents: Vec<Document> = (1..=8)
            .filter(|_| rng.next() % 3 != 0)
            .map(|id| doc(id, DocumentStatus::Ingested))
            .collect();
        state = load(state, documents);

        for _ in 0..3 {
            let id = (rng.next() % 10) as DocumentId;
            state = toggle(state, id);
        }

        let registry_ids = state.registry().ids();
        let selected: BTreeSet<DocumentId> = state.selection().ids().clone();
        assert!(
            selected.is_subset(&registry_ids),
            "selection {selected:?} escaped registry {registry_ids:?}"
        );
    }
}

#[test]
fn removed_document_is_pruned_silently() {
    init_logging();
    let state = load(
        AppState::new(),
        vec![
            doc(3, DocumentStatus::Ingested),
            doc(4, DocumentStatus::Ingested),
        ],
    );
    let state = toggle(state, 4);
    assert!(state.selection().contains(4));

    let (state, effects) = update(
        state,
        Msg::DocumentsLoaded(vec![doc(3, DocumentStatus::Ingested)]),
    );

    assert!(!state.selection().contains(4));
    assert!(state.notices().is_empty());
    assert!(effects.is_empty());
    assert_eq!(state.view().summarize.refusal_message(), Some("Select a document to summarize"));
}

#[test]
fn refresh_replaces_registry_wholesale() {
    init_logging();
    let state = load(
        AppState::new(),
        vec![
            doc(1, DocumentStatus::Parsing),
            doc(2, DocumentStatus::Ingested),
        ],
    );
    let mut state = load(state, vec![doc(5, DocumentStatus::Error)]);

    let view = state.view();
    assert_eq!(view.document_count, 1);
    assert_eq!(view.documents[0].id, 5);
    assert_eq!(view.documents[0].label, "Error");
    assert!(!view.ingesting);
    assert!(state.consume_dirty());
}

#[test]
fn reconcile_is_order_independent() {
    init_logging();
    let base = load(
        AppState::new(),
        vec![
            doc(1, DocumentStatus::Ingested),
            doc(2, DocumentStatus::Ingested),
            doc(3, DocumentStatus::Ingested),
        ],
    );
    let base = toggle(toggle(toggle(base, 1), 2), 3);

    let a = vec![doc(1, DocumentStatus::Ingested), doc(2, DocumentStatus::Ingested)];
    let b = vec![doc(2, DocumentStatus::Ingested), doc(3, DocumentStatus::Ingested)];

    let ab = load(load(base.clone(), a.clone()), b.clone());
    let ba = load(load(base, b), a);

    let expected: BTreeSet<DocumentId> = [2].into_iter().collect();
    assert_eq!(ab.selection().ids(), &expected);
    assert_eq!(ba.selection().ids(), &expected);
}

#[test]
fn view_marks_selected_and_pending_rows() {
    init_logging();
    let state = load(
        AppState::new(),
        vec![
            doc(1, DocumentStatus::Embedding),
            doc(2, DocumentStatus::Ingested),
        ],
    );
    let state = toggle(state, 2);
    let view = state.view();

    assert!(view.ingesting);
    assert_eq!(view.ingested_count, 1);
    assert_eq!(view.selected, vec![2]);
    assert!(!view.documents[0].selected);
    assert!(view.documents[1].selected);
    assert_eq!(view.documents[0].label, "Embedding");
}
