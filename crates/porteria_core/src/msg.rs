#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Config store contents read at startup.
    ConfigLoaded { api_url: String },
    /// User clicked "save" with the given API URL text.
    SaveApiUrlClicked(String),
    /// Persisting the API URL failed; the in-memory value is kept.
    ApiUrlPersistFailed(String),
    /// User edited the token input box.
    TokenInputChanged(String),
    /// User asked to check the current token input.
    CheckTokenClicked,
    /// Directory client finished a lookup.
    LookupCompleted {
        request_id: crate::RequestId,
        result: crate::LookupResult,
    },
    /// Photo fetcher finished. The error is a display string.
    PhotoFetched {
        request_id: crate::RequestId,
        result: Result<Vec<u8>, String>,
    },
    /// User asked to scan a QR code.
    ScanClicked,
    /// User stopped the scan or closed the viewer.
    ScanCancelClicked,
    /// Scan worker delivered its single outcome.
    ScanFinished(crate::ScanOutcome),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
