/// Photo slot of the identity panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PhotoView {
    #[default]
    None,
    /// Matched record carries no photo reference and no legajo.
    Unavailable,
    Loading { url: String },
    Loaded { url: String, bytes: Vec<u8> },
    /// Non-fatal: the identity fields are still shown.
    Failed { url: String, reason: String },
}

/// Flat, displayable projection of the session. No logic lives here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub api_url: String,
    pub pending_token: String,
    pub result_message: String,
    pub result_ok: bool,
    pub name: String,
    pub dni: String,
    pub last_legajo: String,
    pub last_token: String,
    pub photo: PhotoView,
    pub scan_in_flight: bool,
    pub lookup_in_flight: bool,
    pub dirty: bool,
}
