use crate::{Effect, Msg, ScanOutcome, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConfigLoaded { api_url } => {
            state.set_api_url(api_url.trim().to_string());
            Vec::new()
        }
        Msg::SaveApiUrlClicked(raw) => {
            let url = raw.trim();
            if url.is_empty() {
                state.report(false, "The API URL cannot be empty!");
                Vec::new()
            } else {
                let url = url.to_string();
                state.set_api_url(url.clone());
                state.report(true, "API URL saved.");
                vec![Effect::PersistApiUrl { url }]
            }
        }
        Msg::ApiUrlPersistFailed(reason) => {
            state.report(false, format!("Could not save the API URL: {reason}"));
            Vec::new()
        }
        Msg::TokenInputChanged(text) => {
            state.set_pending_token(text);
            Vec::new()
        }
        Msg::CheckTokenClicked => {
            // Identity goes first so a rejected or failed lookup never shows stale data.
            state.clear_identity();
            let token = state.pending_token().trim().to_string();
            if token.is_empty() {
                state.report(false, "Please enter a token.");
                return (state, Vec::new());
            }
            if state.api_url().is_empty() {
                state.report(false, "Configure the API URL first.");
                return (state, Vec::new());
            }
            let api_url = state.api_url().to_string();
            let request_id = state.begin_lookup(token.clone());
            state.report(true, "Checking token...");
            vec![Effect::Lookup {
                request_id,
                api_url,
                token,
            }]
        }
        Msg::LookupCompleted { request_id, result } => {
            if !state.is_active_request(request_id) {
                return (state, Vec::new());
            }
            match state.apply_lookup(result) {
                Some(url) => vec![Effect::FetchPhoto { request_id, url }],
                None => Vec::new(),
            }
        }
        Msg::PhotoFetched { request_id, result } => {
            if state.is_active_request(request_id) {
                state.apply_photo(result);
            }
            Vec::new()
        }
        Msg::ScanClicked => {
            if state.scan_in_flight() {
                Vec::new()
            } else {
                state.set_scan_in_flight(true);
                state.report(true, "Opening camera to scan QR...");
                vec![Effect::StartScan]
            }
        }
        Msg::ScanCancelClicked => {
            // The flag clears when the worker reports `Cancelled`.
            if state.scan_in_flight() {
                vec![Effect::CancelScan]
            } else {
                Vec::new()
            }
        }
        Msg::ScanFinished(outcome) => {
            if !state.scan_in_flight() {
                return (state, Vec::new());
            }
            state.set_scan_in_flight(false);
            match outcome {
                ScanOutcome::Decoded(payload) => {
                    state.set_pending_token(payload);
                    state.report(true, "QR scanned successfully.");
                }
                ScanOutcome::Cancelled => state.report(false, "QR scan cancelled."),
                ScanOutcome::Error(message) => {
                    state.report(false, format!("QR scan failed: {message}"))
                }
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
