use crate::view_model::{PhotoView, SessionView};
use crate::{LookupResult, StudentRecord};

pub type RequestId = u64;

/// Everything the session controller knows. Only `update` mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    api_url: String,
    pending_token: String,
    last_result: Option<LookupResult>,
    scan_in_flight: bool,
    /// Id of the lookup whose results are still wanted.
    active_request: Option<RequestId>,
    next_request_id: RequestId,
    in_flight_token: String,
    /// Waiting on the directory itself; a photo download does not count.
    lookup_pending: bool,
    result_message: String,
    result_ok: bool,
    identity: Option<StudentRecord>,
    last_token: String,
    photo: PhotoView,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionView {
        let (name, dni, legajo) = match &self.identity {
            Some(record) => (
                record.name.clone(),
                record.dni.clone(),
                record.legajo.clone(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        SessionView {
            api_url: self.api_url.clone(),
            pending_token: self.pending_token.clone(),
            result_message: self.result_message.clone(),
            result_ok: self.result_ok,
            name,
            dni,
            last_legajo: legajo,
            last_token: self.last_token.clone(),
            photo: self.photo.clone(),
            scan_in_flight: self.scan_in_flight,
            lookup_in_flight: self.lookup_pending,
            dirty: self.dirty,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn pending_token(&self) -> &str {
        &self.pending_token
    }

    pub fn last_result(&self) -> Option<&LookupResult> {
        self.last_result.as_ref()
    }

    pub fn scan_in_flight(&self) -> bool {
        self.scan_in_flight
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_api_url(&mut self, url: String) {
        self.api_url = url;
        self.mark_dirty();
    }

    pub(crate) fn set_pending_token(&mut self, text: String) {
        if self.pending_token != text {
            self.pending_token = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn report(&mut self, ok: bool, message: impl Into<String>) {
        self.result_ok = ok;
        self.result_message = message.into();
        self.mark_dirty();
    }

    /// Drops the shown identity and forgets any lookup still in flight.
    pub(crate) fn clear_identity(&mut self) {
        self.identity = None;
        self.last_result = None;
        self.last_token.clear();
        self.photo = PhotoView::None;
        self.active_request = None;
        self.in_flight_token.clear();
        self.lookup_pending = false;
        self.mark_dirty();
    }

    pub(crate) fn begin_lookup(&mut self, token: String) -> RequestId {
        self.next_request_id += 1;
        let id = self.next_request_id;
        self.active_request = Some(id);
        self.in_flight_token = token;
        self.lookup_pending = true;
        self.mark_dirty();
        id
    }

    pub(crate) fn is_active_request(&self, request_id: RequestId) -> bool {
        self.active_request == Some(request_id)
    }

    /// Applies a finished lookup in one step. Returns the photo URL to fetch, if any.
    pub(crate) fn apply_lookup(&mut self, result: LookupResult) -> Option<String> {
        let token = std::mem::take(&mut self.in_flight_token);
        self.lookup_pending = false;
        let mut photo_url = None;
        match &result {
            LookupResult::Matched {
                record,
                photo_url: url,
            } => {
                self.identity = Some(record.clone());
                self.last_token = token;
                self.photo = match url {
                    Some(url) => PhotoView::Loading { url: url.clone() },
                    None => PhotoView::Unavailable,
                };
                photo_url = url.clone();
                self.result_ok = true;
                self.result_message = "Valid token! Student found.".to_string();
            }
            LookupResult::NotMatched => {
                self.result_ok = false;
                self.result_message = "Token does not belong to any student.".to_string();
            }
            LookupResult::ApiError(message) => {
                self.result_ok = false;
                self.result_message = format!("API error: {message}");
            }
            LookupResult::ConnectionError(message) => {
                self.result_ok = false;
                self.result_message = format!("Connection error: {message}");
            }
        }
        self.last_result = Some(result);
        if photo_url.is_none() {
            self.active_request = None;
        }
        self.mark_dirty();
        photo_url
    }

    /// Photo results only touch the photo; identity fields stay as they are.
    pub(crate) fn apply_photo(&mut self, result: Result<Vec<u8>, String>) {
        let url = match &self.photo {
            PhotoView::Loading { url } => url.clone(),
            _ => return,
        };
        self.photo = match result {
            Ok(bytes) => PhotoView::Loaded { url, bytes },
            Err(reason) => PhotoView::Failed { url, reason },
        };
        self.active_request = None;
        self.mark_dirty();
    }

    pub(crate) fn set_scan_in_flight(&mut self, in_flight: bool) {
        self.scan_in_flight = in_flight;
        self.mark_dirty();
    }
}
