use futures_util::StreamExt;
use porteria_logging::{porteria_debug, porteria_warn};
use reqwest::header::CONTENT_TYPE;

use crate::client::{build_client, map_reqwest_error, parse_url};
use crate::{ClientSettings, FailureKind, FetchError};

#[async_trait::async_trait]
pub trait PhotoFetcher: Send + Sync {
    /// Downloads the raw image bytes behind an absolute URL. Single attempt.
    async fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestPhotoFetcher {
    settings: ClientSettings,
}

impl ReqwestPhotoFetcher {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_photo_bytes,
                actual: Some(actual),
            },
            "photo too large",
        )
    }
}

#[async_trait::async_trait]
impl PhotoFetcher for ReqwestPhotoFetcher {
    async fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let parsed = parse_url(url)?;
        let client = build_client(&self.settings)?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            porteria_warn!("Photo request failed with {}", status);
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_photo_bytes {
                return Err(self.too_large(content_len));
            }
        }

        if let Some(ct) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !ct.starts_with("image/") {
                porteria_debug!("Photo served as {}", ct);
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_photo_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        porteria_debug!("Photo downloaded, {} bytes", bytes.len());
        Ok(bytes)
    }
}
