//! Cancellable repeating task: one per view.
//!
//! A [`Poller`] runs its tick immediately, then once per interval, on its own
//! thread. Ticks within one poller never overlap. Stopping (explicitly or by
//! dropping the handle) waits for an in-flight tick to finish and guarantees
//! no further tick runs.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Lower bound on the tick interval, so a zero interval cannot spin.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to a running poll loop. Stops the loop when dropped.
#[derive(Debug)]
pub struct Poller {
    name: String,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the loop. `tick` receives a sequence number starting at 1 and
    /// increasing by one per tick.
    pub fn start<F>(name: impl Into<String>, interval: Duration, mut tick: F) -> Result<Self>
    where
        F: FnMut(u64) + Send + 'static,
    {
        let name = name.into();
        let interval = interval.max(MIN_INTERVAL);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread_name = format!("poll-{name}");
        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let mut seq = 0u64;
                loop {
                    seq += 1;
                    tick(seq);
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!(thread = %thread_name, ticks = seq, "poller stopped");
            })
            .with_context(|| format!("failed to spawn poller for {name}"))?;

        debug!(poller = %name, interval_ms = interval.as_millis() as u64, "poller started");

        Ok(Self {
            name,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for the thread to exit. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!(poller = %self.name, "poll thread panicked");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
