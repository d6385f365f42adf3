use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use porteria_core::{Effect, Msg, ScanOutcome};
use porteria_engine::{CameraDevice, ConfigStore, EngineEvent, EngineHandle, ScanError, ScanWorker};
use porteria_logging::{porteria_info, porteria_warn, redact_token};

use super::persistence;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Executes effects produced by `update` and turns their results back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    scanner: ScanWorker,
    camera: Arc<dyn CameraDevice>,
    store: Arc<dyn ConfigStore>,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        scanner: ScanWorker,
        camera: Arc<dyn CameraDevice>,
        store: Arc<dyn ConfigStore>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        Self {
            engine,
            scanner,
            camera,
            store,
            msg_tx,
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistApiUrl { url } => {
                    if let Err(err) = persistence::save_api_url(self.store.as_ref(), &url) {
                        let _ = self.msg_tx.send(Msg::ApiUrlPersistFailed(err.to_string()));
                    }
                }
                Effect::Lookup {
                    request_id,
                    api_url,
                    token,
                } => {
                    porteria_info!(
                        "Lookup request_id={} token {}",
                        request_id,
                        redact_token(&token)
                    );
                    self.engine.lookup(request_id, api_url, token);
                }
                Effect::FetchPhoto { request_id, url } => {
                    porteria_info!("FetchPhoto request_id={}", request_id);
                    self.engine.fetch_photo(request_id, url);
                }
                Effect::StartScan => self.start_scan(),
                Effect::CancelScan => {
                    porteria_info!("Cancelling scan");
                    self.scanner.cancel();
                }
            }
        }
    }

    /// Moves finished engine work onto the message channel.
    pub fn pump_engine_events(&self) {
        while let Some(event) = self.engine.try_recv() {
            let msg = match event {
                EngineEvent::LookupCompleted { request_id, result } => {
                    Msg::LookupCompleted { request_id, result }
                }
                EngineEvent::PhotoFetched { request_id, result } => Msg::PhotoFetched {
                    request_id,
                    result: result.map_err(|err| {
                        porteria_warn!("Photo for request {} failed: {}", request_id, err);
                        err.to_string()
                    }),
                },
            };
            let _ = self.msg_tx.send(msg);
        }
    }

    /// Cancels any scan and waits for the camera to be released.
    pub fn shutdown(&self) {
        if !self.scanner.shutdown(SHUTDOWN_GRACE) {
            porteria_warn!("Exiting before the camera was released");
        }
    }

    fn start_scan(&self) {
        match self.scanner.start(self.camera.clone()) {
            Ok(session) => {
                let msg_tx = self.msg_tx.clone();
                // Waits off the main loop; the outcome arrives as a single message.
                thread::spawn(move || {
                    let _ = msg_tx.send(Msg::ScanFinished(session.wait()));
                });
            }
            Err(ScanError::Busy) => {
                porteria_warn!("Scan requested while another one is running");
            }
            Err(err) => {
                porteria_warn!("Scan could not start: {}", err);
                let _ = self
                    .msg_tx
                    .send(Msg::ScanFinished(ScanOutcome::Error(err.to_string())));
            }
        }
    }
}
