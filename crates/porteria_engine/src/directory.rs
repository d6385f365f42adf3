//! Directory client: submits a token and normalizes whatever the server answers.

use porteria_core::{LookupResult, StudentRecord};
use porteria_logging::{porteria_debug, porteria_info, porteria_warn, redact_token};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::client::{build_client, map_reqwest_error, parse_url};
use crate::ClientSettings;

/// Where servers have been seen to put the matched record, tried in order.
const RECORD_PATHS: &[&[&str]] = &[&["alumno"], &["detalle", "alumno"]];

/// Photo paths hang off the API root, which is everything before this marker.
const API_ROOT_MARKER: &str = "/alumnos";

#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    /// Submits an already trimmed, non-empty token. Never retries.
    async fn lookup(&self, api_url: &str, token: &str) -> LookupResult;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestDirectory {
    settings: ClientSettings,
}

impl ReqwestDirectory {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl Directory for ReqwestDirectory {
    async fn lookup(&self, api_url: &str, token: &str) -> LookupResult {
        let url = match parse_url(api_url) {
            Ok(url) => url,
            Err(err) => return LookupResult::ConnectionError(err.to_string()),
        };
        let client = match build_client(&self.settings) {
            Ok(client) => client,
            Err(err) => return LookupResult::ConnectionError(err.to_string()),
        };

        porteria_info!("Lookup POST {} token {}", api_url, redact_token(token));
        let body = serde_json::json!({ "token": token }).to_string();
        let response = match client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                let err = map_reqwest_error(err);
                porteria_warn!("Lookup transport failure: {}", err);
                return LookupResult::ConnectionError(err.to_string());
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return LookupResult::ConnectionError(map_reqwest_error(err).to_string()),
        };
        porteria_debug!("Lookup answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            let message = api_error_message(status.as_u16(), &body);
            porteria_warn!("Lookup rejected with {}: {}", status, message);
            return LookupResult::ApiError(message);
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(data) => normalize_response(&data, api_url, token),
            Err(err) => LookupResult::ApiError(format!("invalid response body: {err}")),
        }
    }
}

/// Turns a successful response body into a lookup result.
pub fn normalize_response(data: &Value, api_url: &str, token: &str) -> LookupResult {
    let Some(source) = locate_record(data) else {
        return LookupResult::NotMatched;
    };
    let record = StudentRecord {
        name: field_text(source, "nombres"),
        dni: field_text(source, "dni"),
        legajo: field_text(source, "legajo"),
        photo_ref: field_text(source, "foto"),
    };
    let photo_url = resolve_photo_url(&record.photo_ref, &record.legajo, api_url, token);
    LookupResult::Matched { record, photo_url }
}

/// Builds the absolute photo URL for a record.
///
/// An empty `photo_ref` is synthesized from `legajo`; a relative one is joined
/// onto the API root; anything starting with `http` is used as is. Returns
/// `None` when there is neither a reference nor a legajo.
pub fn resolve_photo_url(
    photo_ref: &str,
    legajo: &str,
    api_url: &str,
    token: &str,
) -> Option<String> {
    let base = api_root(api_url);
    if photo_ref.is_empty() {
        if legajo.is_empty() {
            None
        } else {
            Some(format!("{base}/alumnos/foto/{legajo}?token={token}"))
        }
    } else if photo_ref.starts_with("http") {
        Some(photo_ref.to_string())
    } else {
        Some(format!("{base}/{}", photo_ref.trim_start_matches('/')))
    }
}

fn api_root(api_url: &str) -> &str {
    match api_url.find(API_ROOT_MARKER) {
        Some(idx) => &api_url[..idx],
        None => api_url,
    }
}

/// The first path that reaches an object decides, even when that object is empty.
fn locate_record(data: &Value) -> Option<&Map<String, Value>> {
    RECORD_PATHS
        .iter()
        .find_map(|path| {
            let mut node = data;
            for key in path.iter() {
                node = node.as_object()?.get(*key)?;
            }
            node.as_object()
        })
        // An empty record means "no student" on the servers we talk to.
        .filter(|record| !record.is_empty())
}

fn field_text(record: &Map<String, Value>, key: &str) -> String {
    record.get(key).map(value_text).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn api_error_message(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detalle") {
            Some(detail) => value_text(detail),
            None => String::from_utf8_lossy(body).into_owned(),
        },
        _ => status.to_string(),
    }
}
