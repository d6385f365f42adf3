use std::sync::Once;

use porteria_core::{update, Effect, Msg, ScanOutcome, SessionState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(porteria_logging::initialize_for_tests);
}

fn scanning() -> SessionState {
    let (state, effects) = update(SessionState::new(), Msg::ScanClicked);
    assert_eq!(effects, vec![Effect::StartScan]);
    state
}

#[test]
fn scan_click_starts_worker_once() {
    init_logging();
    let state = scanning();
    let view = state.view();
    assert!(view.scan_in_flight);
    assert!(view.result_ok);
    assert_eq!(view.result_message, "Opening camera to scan QR...");

    let (state, effects) = update(state, Msg::ScanClicked);
    assert!(effects.is_empty());
    assert!(state.scan_in_flight());
}

#[test]
fn decoded_payload_fills_token_without_submitting() {
    init_logging();
    let (state, _) = update(scanning(), Msg::TokenInputChanged("old".to_string()));

    let (state, effects) = update(
        state,
        Msg::ScanFinished(ScanOutcome::Decoded("TOK123".to_string())),
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.pending_token, "TOK123");
    assert!(!view.scan_in_flight);
    assert!(!view.lookup_in_flight);
    assert_eq!(view.result_message, "QR scanned successfully.");
}

#[test]
fn cancel_emits_effect_and_waits_for_outcome() {
    init_logging();
    let (state, effects) = update(scanning(), Msg::ScanCancelClicked);
    assert_eq!(effects, vec![Effect::CancelScan]);
    assert!(state.scan_in_flight());

    let (state, effects) = update(state, Msg::ScanFinished(ScanOutcome::Cancelled));
    assert!(effects.is_empty());
    assert!(!state.scan_in_flight());
    assert_eq!(state.view().result_message, "QR scan cancelled.");
    assert_eq!(state.pending_token(), "");
}

#[test]
fn cancel_without_scan_is_ignored() {
    init_logging();
    let (state, effects) = update(SessionState::new(), Msg::ScanCancelClicked);
    assert!(effects.is_empty());
    assert_eq!(state, SessionState::new());
}

#[test]
fn scan_error_is_reported() {
    init_logging();
    let (state, _) = update(
        scanning(),
        Msg::ScanFinished(ScanOutcome::Error("camera not found".to_string())),
    );

    let view = state.view();
    assert!(!view.result_ok);
    assert_eq!(view.result_message, "QR scan failed: camera not found");
    assert!(!view.scan_in_flight);
}

#[test]
fn outcome_without_running_scan_is_dropped() {
    init_logging();
    let (state, _) = update(
        SessionState::new(),
        Msg::ScanFinished(ScanOutcome::Decoded("TOK".to_string())),
    );
    assert_eq!(state.pending_token(), "");
}

#[test]
fn scan_can_restart_after_outcome() {
    init_logging();
    let (state, _) = update(scanning(), Msg::ScanFinished(ScanOutcome::Cancelled));
    let (state, effects) = update(state, Msg::ScanClicked);
    assert_eq!(effects, vec![Effect::StartScan]);
    assert!(state.scan_in_flight());
}
