use std::sync::Once;

use porteria_core::{update, Effect, Msg, SessionState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(porteria_logging::initialize_for_tests);
}

#[test]
fn config_loaded_sets_api_url() {
    init_logging();
    let (state, effects) = update(
        SessionState::new(),
        Msg::ConfigLoaded {
            api_url: "http://host/api/alumnos".to_string(),
        },
    );

    assert_eq!(state.api_url(), "http://host/api/alumnos");
    assert!(effects.is_empty());
}

#[test]
fn save_api_url_trims_and_persists() {
    init_logging();
    let (mut state, effects) = update(
        SessionState::new(),
        Msg::SaveApiUrlClicked("  http://host/api/alumnos \n".to_string()),
    );

    assert_eq!(state.api_url(), "http://host/api/alumnos");
    assert_eq!(
        effects,
        vec![Effect::PersistApiUrl {
            url: "http://host/api/alumnos".to_string()
        }]
    );
    let view = state.view();
    assert!(view.result_ok);
    assert_eq!(view.result_message, "API URL saved.");
    assert!(state.consume_dirty());
}

#[test]
fn blank_api_url_is_rejected_and_previous_value_kept() {
    init_logging();
    let (state, _) = update(
        SessionState::new(),
        Msg::ConfigLoaded {
            api_url: "http://old/alumnos".to_string(),
        },
    );

    let (state, effects) = update(state, Msg::SaveApiUrlClicked("   ".to_string()));

    assert!(effects.is_empty());
    assert_eq!(state.api_url(), "http://old/alumnos");
    let view = state.view();
    assert!(!view.result_ok);
    assert_eq!(view.result_message, "The API URL cannot be empty!");
}

#[test]
fn persist_failure_is_reported_but_url_kept() {
    init_logging();
    let (state, _) = update(
        SessionState::new(),
        Msg::SaveApiUrlClicked("http://host/alumnos".to_string()),
    );
    let (state, effects) = update(
        state,
        Msg::ApiUrlPersistFailed("disk full".to_string()),
    );

    assert!(effects.is_empty());
    assert_eq!(state.api_url(), "http://host/alumnos");
    assert!(!state.view().result_ok);
    assert!(state.view().result_message.contains("disk full"));
}
