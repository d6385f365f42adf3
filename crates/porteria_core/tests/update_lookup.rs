use std::sync::Once;

use porteria_core::{update, Effect, LookupResult, Msg, PhotoView, SessionState, StudentRecord};
use pretty_assertions::assert_eq;

const API_URL: &str = "http://host/api/alumnos";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(porteria_logging::initialize_for_tests);
}

fn configured() -> SessionState {
    let (state, _) = update(
        SessionState::new(),
        Msg::ConfigLoaded {
            api_url: API_URL.to_string(),
        },
    );
    state
}

fn submit(state: SessionState, token: &str) -> (SessionState, Vec<Effect>) {
    let (state, _) = update(state, Msg::TokenInputChanged(token.to_string()));
    update(state, Msg::CheckTokenClicked)
}

fn ana() -> StudentRecord {
    StudentRecord {
        name: "Ana".to_string(),
        dni: "1".to_string(),
        legajo: "5".to_string(),
        photo_ref: String::new(),
    }
}

fn matched_with_photo() -> LookupResult {
    LookupResult::Matched {
        record: ana(),
        photo_url: Some("http://host/api/alumnos/foto/5?token=T1".to_string()),
    }
}

#[test]
fn empty_token_is_rejected_without_network() {
    init_logging();
    let (state, effects) = submit(configured(), "   \t ");

    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.result_ok);
    assert_eq!(view.result_message, "Please enter a token.");
    assert!(!view.lookup_in_flight);
}

#[test]
fn missing_api_url_is_rejected_without_network() {
    init_logging();
    let (state, effects) = submit(SessionState::new(), "T1");

    assert!(effects.is_empty());
    assert_eq!(state.view().result_message, "Configure the API URL first.");
}

#[test]
fn submit_trims_token_and_emits_lookup() {
    init_logging();
    let (state, effects) = submit(configured(), "  T1 \n");

    assert_eq!(
        effects,
        vec![Effect::Lookup {
            request_id: 1,
            api_url: API_URL.to_string(),
            token: "T1".to_string(),
        }]
    );
    assert!(state.view().lookup_in_flight);
}

#[test]
fn match_populates_identity_and_requests_photo() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    let (mut state, effects) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: matched_with_photo(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::FetchPhoto {
            request_id: 1,
            url: "http://host/api/alumnos/foto/5?token=T1".to_string(),
        }]
    );
    let view = state.view();
    assert!(view.result_ok);
    assert_eq!(view.name, "Ana");
    assert_eq!(view.dni, "1");
    assert_eq!(view.last_legajo, "5");
    assert_eq!(view.last_token, "T1");
    assert_eq!(
        view.photo,
        PhotoView::Loading {
            url: "http://host/api/alumnos/foto/5?token=T1".to_string()
        }
    );
    assert!(state.last_result().is_some_and(LookupResult::is_match));
    assert!(state.consume_dirty());
}

#[test]
fn match_without_photo_finishes_lookup() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    let (state, effects) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: LookupResult::Matched {
                record: ana(),
                photo_url: None,
            },
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.photo, PhotoView::Unavailable);
    assert!(!view.lookup_in_flight);
}

#[test]
fn failed_photo_keeps_name_and_dni() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    let (state, _) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: matched_with_photo(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::PhotoFetched {
            request_id: 1,
            result: Err("http status 404".to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.name, "Ana");
    assert_eq!(view.dni, "1");
    assert!(view.result_ok);
    assert_eq!(view.result_message, "Valid token! Student found.");
    assert_eq!(
        view.photo,
        PhotoView::Failed {
            url: "http://host/api/alumnos/foto/5?token=T1".to_string(),
            reason: "http status 404".to_string(),
        }
    );
}

#[test]
fn loaded_photo_is_exposed_in_view() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    let (state, _) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: matched_with_photo(),
        },
    );
    let (state, _) = update(
        state,
        Msg::PhotoFetched {
            request_id: 1,
            result: Ok(vec![0xFF, 0xD8, 0xFF]),
        },
    );

    match state.view().photo {
        PhotoView::Loaded { bytes, .. } => assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]),
        other => panic!("expected loaded photo, got {other:?}"),
    }
    assert!(!state.view().lookup_in_flight);
}

#[test]
fn error_variants_surface_messages() {
    init_logging();
    let cases = [
        (
            LookupResult::NotMatched,
            "Token does not belong to any student.",
        ),
        (
            LookupResult::ApiError("Token expired".to_string()),
            "API error: Token expired",
        ),
        (
            LookupResult::ConnectionError("connection refused".to_string()),
            "Connection error: connection refused",
        ),
    ];

    for (result, expected) in cases {
        let (state, _) = submit(configured(), "T1");
        let (state, effects) = update(
            state,
            Msg::LookupCompleted {
                request_id: 1,
                result,
            },
        );
        assert!(effects.is_empty());
        let view = state.view();
        assert!(!view.result_ok);
        assert_eq!(view.result_message, expected);
        assert_eq!(view.name, "");
        assert_eq!(view.photo, PhotoView::None);
    }
}

#[test]
fn new_submission_clears_previous_identity() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    let (state, _) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: matched_with_photo(),
        },
    );
    assert_eq!(state.view().name, "Ana");

    let (state, effects) = submit(state, "T2");
    assert!(state.last_result().is_none());
    let view = state.view();
    assert_eq!(view.name, "");
    assert_eq!(view.dni, "");
    assert_eq!(view.photo, PhotoView::None);
    assert_eq!(effects.len(), 1);

    // An empty resubmission also clears.
    let (state, _) = update(
        state,
        Msg::LookupCompleted {
            request_id: 2,
            result: matched_with_photo(),
        },
    );
    let (state, effects) = submit(state, "");
    assert!(effects.is_empty());
    assert!(state.last_result().is_none());
    assert_eq!(state.view().name, "");
}

#[test]
fn lookup_flag_drops_once_the_directory_answers() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    assert!(state.view().lookup_in_flight);

    let (state, effects) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: matched_with_photo(),
        },
    );
    assert_eq!(effects.len(), 1);
    let view = state.view();
    assert!(!view.lookup_in_flight);
    assert!(matches!(view.photo, PhotoView::Loading { .. }));

    // The photo for the current lookup is still accepted.
    let (state, _) = update(
        state,
        Msg::PhotoFetched {
            request_id: 1,
            result: Ok(vec![1, 2, 3]),
        },
    );
    assert!(matches!(state.view().photo, PhotoView::Loaded { .. }));
}

#[test]
fn stale_results_are_ignored() {
    init_logging();
    let (state, _) = submit(configured(), "T1");
    let (state, _) = submit(state, "T2");

    let (state, effects) = update(
        state,
        Msg::LookupCompleted {
            request_id: 1,
            result: matched_with_photo(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().name, "");
    assert!(state.view().lookup_in_flight);

    let (state, _) = update(
        state,
        Msg::LookupCompleted {
            request_id: 2,
            result: LookupResult::NotMatched,
        },
    );
    let (state, _) = update(
        state,
        Msg::PhotoFetched {
            request_id: 1,
            result: Ok(vec![1, 2, 3]),
        },
    );
    assert_eq!(state.view().photo, PhotoView::None);
    assert_eq!(
        state.view().result_message,
        "Token does not belong to any student."
    );
}
