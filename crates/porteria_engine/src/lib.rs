//! Porteria engine: directory lookups, photo downloads, QR scanning and config storage.
mod client;
mod config;
mod directory;
mod engine;
mod fetch;
mod persist;
mod scan;
mod types;

pub use client::ClientSettings;
pub use config::{Config, ConfigStore, JsonFileConfigStore};
pub use directory::{normalize_response, resolve_photo_url, Directory, ReqwestDirectory};
pub use engine::EngineHandle;
pub use fetch::{PhotoFetcher, ReqwestPhotoFetcher};
pub use persist::{write_atomically, PersistError};
pub use scan::{
    BarcodeDecoder, CameraDevice, DecodedSymbol, Frame, FrameError, ScanError, ScanSession,
    ScanSettings, ScanState, ScanWorker, VideoSource,
};
pub use types::{EngineEvent, FailureKind, FetchError, RequestId};
