use std::sync::Once;
use std::time::Duration;

use docqa_core::{
    update, AppState, CredentialAction, CredentialStatus, Diagnostics, Effect, HealthSnapshot, Msg,
    NoticeKind,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docqa_logging::initialize_for_tests);
}

#[test]
fn notices_expire_through_scheduled_effect() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::CredentialSubmitted("   ".to_string()));
    let notice = state.notices().entries()[0].clone();
    assert_eq!(notice.message, "Enter a key first");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(
        effects,
        vec![Effect::ExpireNotice {
            id: notice.id.clone(),
            after: Duration::from_millis(3500),
        }]
    );

    let (mut state, _) = update(state, Msg::NoticeDismissed(notice.id.clone()));
    assert!(state.notices().is_empty());
    assert!(state.consume_dirty());

    // Expiry after explicit dismissal is harmless.
    let (mut state, effects) = update(state, Msg::NoticeExpired(notice.id));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn credential_flow_refreshes_diagnostics() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::CredentialSubmitted(" key-123 ".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SetCredential {
            key: "key-123".to_string()
        }]
    );

    let (state, effects) = update(
        state,
        Msg::CredentialUpdated {
            action: CredentialAction::Set,
            result: Ok(()),
        },
    );
    assert_eq!(state.notices().entries()[0].message, "Key set");
    assert_eq!(effects.last(), Some(&Effect::FetchDiagnostics));

    let (state, effects) = update(state, Msg::CredentialClearRequested);
    assert_eq!(effects, vec![Effect::ClearCredential]);
    let (state, _) = update(
        state,
        Msg::CredentialUpdated {
            action: CredentialAction::Clear,
            result: Ok(()),
        },
    );
    assert_eq!(state.notices().entries()[1].message, "Key cleared");
    assert_eq!(state.notices().entries()[1].kind, NoticeKind::Info);

    let (state, _) = update(
        state,
        Msg::CredentialUpdated {
            action: CredentialAction::Set,
            result: Err("400".to_string()),
        },
    );
    assert_eq!(state.notices().entries()[2].message, "Failed to set key");
}

#[test]
fn monitor_snapshots_are_read_only_inputs() {
    init_logging();
    let health = HealthSnapshot {
        status: "degraded".to_string(),
        components: [("qdrant".to_string(), "error: timeout".to_string())]
            .into_iter()
            .collect(),
    };
    let diagnostics = Diagnostics {
        documents_total: 2,
        documents_by_status: [("ingested".to_string(), 2)].into_iter().collect(),
        any_processing: false,
        credential: CredentialStatus {
            active: true,
            last_error: Some("quota".to_string()),
        },
    };
    let (state, effects) = update(AppState::new(), Msg::HealthLoaded(health.clone()));
    assert!(effects.is_empty());
    let (mut state, effects) = update(state, Msg::DiagnosticsLoaded(diagnostics.clone()));
    assert!(effects.is_empty());
    assert!(state.consume_dirty());

    let view = state.view();
    assert_eq!(view.health, Some(health.clone()));
    assert!(view.health_degraded);
    assert_eq!(view.credential, Some(diagnostics.credential.clone()));
    // Degraded health is advisory; asking stays possible.
    assert!(view.can_ask());

    let (mut state, _) = update(state, Msg::HealthLoaded(health));
    assert!(!state.consume_dirty());
}
