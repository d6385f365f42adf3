use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use porteria_core::{update, Msg, SessionState};
use porteria_engine::{ClientSettings, EngineHandle, ScanSettings, ScanWorker};
use porteria_logging::porteria_info;

use super::camera::{FrameDirectoryCamera, RqrrDecoder};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::persistence;
use super::ui::input::{self, UiCommand};
use super::ui::render;

/// How long the loop waits for input before checking on background work.
const TICK: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);
    porteria_info!("porteria starting");

    let store = Arc::new(persistence::config_store());
    let camera = Arc::new(FrameDirectoryCamera::from_env());
    let engine = EngineHandle::new(ClientSettings::default()).context("starting network engine")?;
    let scanner = ScanWorker::new(Arc::new(RqrrDecoder), ScanSettings::default());

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, scanner, camera.clone(), store.clone(), msg_tx.clone());

    let mut out = io::stdout();
    writeln!(out, "Porteria: student token check")?;
    writeln!(out, "Camera frames are read from {}", camera.dir().display())?;
    writeln!(out, "{}", input::HELP)?;

    let mut session = SessionState::new();
    let _ = msg_tx.send(Msg::ConfigLoaded {
        api_url: persistence::load_api_url(store.as_ref()),
    });

    let ui_rx = spawn_input_reader()?;
    loop {
        match ui_rx.recv_timeout(TICK) {
            Ok(UiCommand::Send(msgs)) => {
                for msg in msgs {
                    let _ = msg_tx.send(msg);
                }
            }
            Ok(UiCommand::Help) => writeln!(out, "{}", input::HELP)?,
            Ok(UiCommand::Unknown(line)) => {
                writeln!(out, "Unknown command `{line}`. Type `help`.")?
            }
            Ok(UiCommand::Quit) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        runner.pump_engine_events();
        while let Ok(msg) = msg_rx.try_recv() {
            let (next, effects) = update(std::mem::take(&mut session), msg);
            session = next;
            runner.enqueue(effects);
        }

        if session.consume_dirty() {
            for line in render::render(&session.view()) {
                writeln!(out, "{line}")?;
            }
            writeln!(out)?;
            out.flush()?;
        }
    }

    // Closing the viewer counts as cancelling the scan.
    runner.shutdown();
    porteria_info!("porteria exiting");
    Ok(())
}

fn spawn_input_reader() -> io::Result<mpsc::Receiver<UiCommand>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("porteria-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(input::parse_line(&line)).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}
