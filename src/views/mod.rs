//! Per-view state fed by a poller.
//!
//! Each view owns the latest payload it fetched and everything derived from
//! it (ranked Pareto table, hourly buckets, headline figures). Views never share state with
//! each other; the `Arc<RwLock<_>>` around a view only lets its own poller
//! and its own reader (dashboard handler, terminal renderer) reach it.
//!
//! Every update is stamped with the tick sequence number that produced it,
//! and an update older than the one already applied is dropped, so a slow
//! response can never overwrite newer data.

mod gauges;
mod health;
mod history;
mod output;
mod rejections;
mod running_time;
mod stoppages;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::analytics::poll_log::{self, PollEvent};
use crate::client::ApiClient;
use crate::poller::Poller;

pub use gauges::GaugeView;
pub use health::HealthView;
pub use history::HistoryView;
pub use output::{OutputData, OutputView};
pub use rejections::RejectionView;
pub use running_time::{RunningTimeData, RunningTimeView};
pub use stoppages::StoppageView;

/// A view shared between its poller and its reader.
pub type Shared<V> = Arc<RwLock<V>>;

// ---------------------------------------------------------------------------
// Freshness bookkeeping
// ---------------------------------------------------------------------------

/// When a view last changed and whether its latest poll failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Freshness {
    /// Sequence number of the newest applied payload (0 = none yet).
    pub applied_seq: u64,
    pub updated_at: Option<DateTime<Utc>>,
    /// Error of the most recent failed poll, cleared by the next success.
    pub last_error: Option<String>,
}

impl Freshness {
    /// Accept `seq` if it is newer than anything applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied_seq {
            return false;
        }
        self.applied_seq = seq;
        self.updated_at = Some(Utc::now());
        self.last_error = None;
        true
    }

    /// Record a failed poll. Errors from ticks older than the applied
    /// payload are ignored.
    pub fn fail(&mut self, seq: u64, error: String) {
        if seq > self.applied_seq {
            self.last_error = Some(error);
        }
    }

    pub fn has_data(&self) -> bool {
        self.applied_seq > 0
    }
}

// ---------------------------------------------------------------------------
// Polled views
// ---------------------------------------------------------------------------

/// A view whose data comes from the backend.
pub trait PolledView: Send + Sync + 'static {
    type Data: Send;
    /// What a fetch needs to know about the view, copied out before the
    /// request so no lock is held while it runs.
    type Query: Send;

    /// Short name used for logging and the poller thread.
    fn name(&self) -> &'static str;

    fn query(&self) -> Self::Query;

    fn fetch(client: &ApiClient, query: &Self::Query) -> Result<Self::Data>;

    /// Replace the view's data. Returns `false` when `seq` is stale.
    fn apply(&mut self, seq: u64, data: Self::Data) -> bool;

    fn freshness(&self) -> &Freshness;

    fn freshness_mut(&mut self) -> &mut Freshness;

    /// Number of entries currently derived, for the poll log.
    fn entry_count(&self) -> usize;
}

pub fn shared<V>(view: V) -> Shared<V> {
    Arc::new(RwLock::new(view))
}

/// Read a shared view, recovering from a poisoned lock.
pub fn read<V>(view: &Shared<V>) -> RwLockReadGuard<'_, V> {
    view.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn write<V>(view: &Shared<V>) -> RwLockWriteGuard<'_, V> {
    view.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run one fetch-and-apply cycle for a view.
pub fn refresh<V: PolledView>(view: &Shared<V>, client: &ApiClient, seq: u64, poll_log: bool) {
    let query = read(view).query();
    let started = Instant::now();
    let result = V::fetch(client, &query);
    let latency_ms = started.elapsed().as_millis() as u64;

    let mut guard = write(view);
    let name = guard.name();
    let event = match result {
        Ok(data) => {
            if guard.apply(seq, data) {
                debug!(view = name, seq, latency_ms, "view refreshed");
            } else {
                debug!(view = name, seq, "stale payload dropped");
            }
            PollEvent::success(name, seq, guard.entry_count(), latency_ms)
        }
        Err(e) => {
            let message = format!("{e:#}");
            warn!(view = name, seq, error = %message, "poll failed");
            guard.freshness_mut().fail(seq, message.clone());
            PollEvent::failure(name, seq, latency_ms, &message)
        }
    };
    drop(guard);

    if poll_log {
        poll_log::log_poll_event(&event);
    }
}

/// Keep the part of a multi-request fetch that succeeded.
pub(crate) fn keep_ok<T>(view: &str, what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(view, what, error = %format!("{e:#}"), "partial fetch failed");
            None
        }
    }
}

/// Start polling `client` into `view` every `interval`.
///
/// The returned [`Poller`] stops the refresh loop when dropped.
pub fn watch<V: PolledView>(
    view: Shared<V>,
    client: ApiClient,
    interval: Duration,
    poll_log: bool,
) -> Result<Poller> {
    let name = read(&view).name();
    Poller::start(name, interval, move |seq| {
        refresh(&view, &client, seq, poll_log);
    })
}
