use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::{
    ClientSettings, Directory, EngineEvent, PhotoFetcher, ReqwestDirectory, ReqwestPhotoFetcher,
    RequestId,
};

enum EngineCommand {
    Lookup {
        request_id: RequestId,
        api_url: String,
        token: String,
    },
    FetchPhoto {
        request_id: RequestId,
        url: String,
    },
}

/// Runs network work on its own thread and hands results back as events.
///
/// Each command produces exactly one event carrying the same request id.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> io::Result<Self> {
        Self::with_services(
            Arc::new(ReqwestDirectory::new(settings.clone())),
            Arc::new(ReqwestPhotoFetcher::new(settings)),
        )
    }

    pub fn with_services(
        directory: Arc<dyn Directory>,
        photos: Arc<dyn PhotoFetcher>,
    ) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("porteria-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let directory = directory.clone();
                    let photos = photos.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        let event = handle_command(directory.as_ref(), photos.as_ref(), command).await;
                        let _ = event_tx.send(event);
                    });
                }
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn lookup(&self, request_id: RequestId, api_url: impl Into<String>, token: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Lookup {
            request_id,
            api_url: api_url.into(),
            token: token.into(),
        });
    }

    pub fn fetch_photo(&self, request_id: RequestId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::FetchPhoto {
            request_id,
            url: url.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    directory: &dyn Directory,
    photos: &dyn PhotoFetcher,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::Lookup {
            request_id,
            api_url,
            token,
        } => EngineEvent::LookupCompleted {
            request_id,
            result: directory.lookup(&api_url, &token).await,
        },
        EngineCommand::FetchPhoto { request_id, url } => EngineEvent::PhotoFetched {
            request_id,
            result: photos.fetch_photo(&url).await,
        },
    }
}
