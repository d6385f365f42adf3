//! QR scan worker.
//!
//! One background thread per scan session reads frames from a video source,
//! runs barcode decoding on each, and reports a single [`ScanOutcome`] through
//! a one-shot channel. The source is released exactly once on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use porteria_core::ScanOutcome;
use porteria_logging::{porteria_debug, porteria_info, porteria_trace, porteria_warn, redact_token};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// One grayscale frame, row-major, `width * height` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Transient hiccup; the loop skips the frame and keeps going.
    #[error("frame dropped: {0}")]
    Dropped(String),
    /// The source is gone; the scan ends with an error.
    #[error("video source closed: {0}")]
    Closed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("a scan is already running")]
    Busy,
    #[error("could not open camera: {0}")]
    Open(String),
    #[error("could not start scan thread: {0}")]
    Spawn(String),
}

pub trait VideoSource: Send {
    fn read_frame(&mut self) -> Result<Frame, FrameError>;
    fn release(&mut self);
}

pub trait CameraDevice: Send + Sync {
    fn open(&self) -> Result<Box<dyn VideoSource>, ScanError>;
}

pub trait BarcodeDecoder: Send + Sync {
    /// Every symbol found in the frame, possibly none.
    fn decode(&self, frame: &Frame) -> Vec<DecodedSymbol>;
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Pause after a dropped frame so a flapping source does not spin the CPU.
    pub dropped_frame_delay: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            dropped_frame_delay: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
}

/// Handle for a running scan session.
///
/// The outcome can be consumed once. Dropping the receiver counts as a cancel.
pub struct ScanSession {
    outcome: oneshot::Receiver<ScanOutcome>,
    cancel: CancellationToken,
}

impl ScanSession {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn into_receiver(self) -> oneshot::Receiver<ScanOutcome> {
        self.outcome
    }

    /// Blocks until the worker reports. Must not be called from async code.
    pub fn wait(self) -> ScanOutcome {
        self.outcome
            .blocking_recv()
            .unwrap_or_else(|_| ScanOutcome::Error("scan worker exited without an outcome".into()))
    }
}

pub struct ScanWorker {
    decoder: Arc<dyn BarcodeDecoder>,
    settings: ScanSettings,
    running: Arc<AtomicBool>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl ScanWorker {
    pub fn new(decoder: Arc<dyn BarcodeDecoder>, settings: ScanSettings) -> Self {
        Self {
            decoder,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ScanState {
        if self.running.load(Ordering::Acquire) {
            ScanState::Running
        } else {
            ScanState::Idle
        }
    }

    /// Starts a scan session. Rejected with [`ScanError::Busy`] while one is running.
    pub fn start(&self, camera: Arc<dyn CameraDevice>) -> Result<ScanSession, ScanError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ScanError::Busy);
        }
        let idle_on_exit = IdleOnDrop(self.running.clone());

        let cancel = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = Some(cancel.clone());

        let (tx, rx) = oneshot::channel();
        let decoder = self.decoder.clone();
        let settings = self.settings.clone();
        let token = cancel.clone();

        thread::Builder::new()
            .name("porteria-qr-scan".to_string())
            .spawn(move || {
                let outcome = run_scan(camera.as_ref(), decoder.as_ref(), &settings, &token, &tx);
                match &outcome {
                    ScanOutcome::Decoded(payload) => {
                        porteria_info!("Scan finished with token {}", redact_token(payload))
                    }
                    other => porteria_info!("Scan finished: {:?}", other),
                }
                // Idle before delivery so the consumer may start the next scan right away.
                drop(idle_on_exit);
                let _ = tx.send(outcome);
            })
            .map_err(|err| ScanError::Spawn(err.to_string()))?;

        Ok(ScanSession {
            outcome: rx,
            cancel,
        })
    }

    /// Signals the running session, if any. Observed at the next loop check.
    pub fn cancel(&self) {
        if let Some(token) = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            token.cancel();
        }
    }

    /// Cancels the running session and waits up to `timeout` for it to wind down.
    ///
    /// Returns `true` once the worker is idle, which means the video source has
    /// been released.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.cancel();
        let deadline = Instant::now() + timeout;
        while self.state() == ScanState::Running {
            if Instant::now() >= deadline {
                porteria_warn!("Scan still running after {:?}", timeout);
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

struct IdleOnDrop(Arc<AtomicBool>);

impl Drop for IdleOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct ReleaseOnDrop(Box<dyn VideoSource>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.release();
    }
}

fn run_scan(
    camera: &dyn CameraDevice,
    decoder: &dyn BarcodeDecoder,
    settings: &ScanSettings,
    cancel: &CancellationToken,
    tx: &oneshot::Sender<ScanOutcome>,
) -> ScanOutcome {
    let stop_requested = || cancel.is_cancelled() || tx.is_closed();

    if stop_requested() {
        return ScanOutcome::Cancelled;
    }
    let mut source = match camera.open() {
        Ok(source) => ReleaseOnDrop(source),
        Err(err) => {
            porteria_warn!("Scan could not start: {}", err);
            return ScanOutcome::Error(err.to_string());
        }
    };

    let mut frames = 0u64;
    loop {
        if stop_requested() {
            porteria_debug!("Scan cancelled after {} frames", frames);
            return ScanOutcome::Cancelled;
        }

        let frame = match source.0.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::Dropped(reason)) => {
                porteria_trace!("Skipping frame: {}", reason);
                if !settings.dropped_frame_delay.is_zero() {
                    thread::sleep(settings.dropped_frame_delay);
                }
                continue;
            }
            Err(err @ FrameError::Closed(_)) => {
                porteria_warn!("Scan aborted after {} frames: {}", frames, err);
                return ScanOutcome::Error(err.to_string());
            }
        };
        frames += 1;

        let Some(symbol) = decoder.decode(&frame).into_iter().next() else {
            continue;
        };
        // A cancel that landed while this frame was decoding takes precedence.
        if stop_requested() {
            porteria_debug!("Scan cancelled with a decoded frame in flight");
            return ScanOutcome::Cancelled;
        }
        porteria_debug!("Decoded QR after {} frames", frames);
        return ScanOutcome::Decoded(symbol.payload);
    }
}
