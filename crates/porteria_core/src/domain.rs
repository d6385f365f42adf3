/// A directory record after the server response has been normalized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudentRecord {
    pub name: String,
    pub dni: String,
    /// Internal directory id. Empty when the server did not send one.
    pub legajo: String,
    /// Photo reference as sent by the server: empty, relative or absolute.
    pub photo_ref: String,
}

/// Canonical answer of a token lookup. Callers never look at raw responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Matched {
        record: StudentRecord,
        photo_url: Option<String>,
    },
    NotMatched,
    /// Server reachable but it rejected the request.
    ApiError(String),
    /// Transport failure: DNS, refused connection, timeout.
    ConnectionError(String),
}

impl LookupResult {
    pub fn is_match(&self) -> bool {
        matches!(self, LookupResult::Matched { .. })
    }
}

/// Terminal result of one scan session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Decoded(String),
    Cancelled,
    Error(String),
}
