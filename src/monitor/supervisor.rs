//! Thread lifecycle for the detector and resolver loops.

use anyhow::{Context, Result};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, warn};

use super::detector::Detector;
use super::resolver::Resolver;
use super::shutdown::ShutdownSignal;

const JOIN_POLL: Duration = Duration::from_millis(100);

/// Start both loops on their own threads and block until both return.
///
/// In normal operation this only returns after `shutdown` is triggered. A loop
/// that exits on its own (panic included) stops the other one too.
pub fn run_loops(detector: Detector, resolver: Resolver, shutdown: &ShutdownSignal) -> Result<()> {
    let detector_handle = spawn_detector(detector, shutdown.clone())?;
    let resolver_handle = match spawn_resolver(resolver, shutdown.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            shutdown.trigger();
            let _ = detector_handle.join();
            return Err(e);
        }
    };

    let mut running = vec![("detector", detector_handle), ("resolver", resolver_handle)];
    while !running.is_empty() {
        let (finished, still_running): (Vec<_>, Vec<_>) = running
            .into_iter()
            .partition(|(_, handle)| handle.is_finished());

        for (name, handle) in finished {
            if handle.join().is_err() {
                error!(loop_name = name, "loop thread panicked, shutting down");
            } else if !shutdown.is_triggered() {
                warn!(loop_name = name, "loop exited without shutdown, shutting down");
            }
            shutdown.trigger();
        }

        running = still_running;
        if !running.is_empty() {
            thread::sleep(JOIN_POLL);
        }
    }

    Ok(())
}

fn spawn_detector(mut detector: Detector, shutdown: ShutdownSignal) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("detector".to_string())
        .spawn(move || detector.run(&shutdown))
        .context("Failed to spawn detector thread")
}

fn spawn_resolver(mut resolver: Resolver, shutdown: ShutdownSignal) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("resolver".to_string())
        .spawn(move || resolver.run(&shutdown))
        .context("Failed to spawn resolver thread")
}
