//! Poll outcome log: one JSONL line per view refresh.
//!
//! Records which view polled, whether it succeeded, how many ranked entries
//! it produced and how long the request took. `oeeview health` reads it back
//! to report recent failures.
//!
//! Log file: `~/.oeeview/poll-log.jsonl`, rotated to `poll-log.jsonl.1` once
//! it passes [`MAX_LOG_BYTES`]. At most two generations exist on disk.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Size at which the active log is rotated.
pub const MAX_LOG_BYTES: u64 = 512 * 1024;

/// Bytes read from the end of the log per requested event. Poll lines are
/// well under this, so the tail always holds `limit` whole lines.
const TAIL_BYTES_PER_EVENT: u64 = 1024;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollEvent {
    pub timestamp: String,
    /// View name, e.g. `"stoppages"`, `"running-time"` or `"oee-history"`.
    pub view: String,
    /// Tick sequence number within the view's poller.
    pub seq: u64,
    pub success: bool,
    /// Ranked entries derived from the payload (0 for failures).
    #[serde(default)]
    pub entries: usize,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl PollEvent {
    pub fn success(view: &str, seq: u64, entries: usize, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            view: view.to_string(),
            seq,
            success: true,
            entries,
            latency_ms,
            error: None,
        }
    }

    pub fn failure(view: &str, seq: u64, latency_ms: u64, error: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            view: view.to_string(),
            seq,
            success: false,
            entries: 0,
            latency_ms,
            error: Some(error.to_string()),
        }
    }
}

/// Counts over a set of poll events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollTally {
    pub total: usize,
    pub failures: usize,
}

pub fn tally(events: &[PollEvent]) -> PollTally {
    PollTally {
        total: events.len(),
        failures: events.iter().filter(|e| !e.success).count(),
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a poll event to `~/.oeeview/poll-log.jsonl`.
///
/// Best-effort: a write failure never interrupts polling.
pub fn log_poll_event(event: &PollEvent) {
    let Some(path) = poll_log_path() else {
        return;
    };
    if let Err(e) = append_event(&path, event) {
        debug!(error = %e, "could not write poll log");
    }
}

pub fn append_event(path: &Path, event: &PollEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    rotate_if_full(path, MAX_LOG_BYTES)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Move a log of `max_bytes` or more aside to `<name>.1`, replacing any
/// previous generation.
fn rotate_if_full(path: &Path, max_bytes: u64) -> Result<()> {
    let Ok(meta) = fs::metadata(path) else {
        return Ok(());
    };
    if meta.len() < max_bytes {
        return Ok(());
    }

    let mut rotated = path.as_os_str().to_owned();
    rotated.push(".1");
    fs::rename(path, PathBuf::from(rotated))?;
    debug!(path = %path.display(), bytes = meta.len(), "poll log rotated");
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read the last `limit` events from the default log. Malformed lines are
/// skipped; a missing file reads as empty.
pub fn read_recent(limit: usize) -> Vec<PollEvent> {
    match poll_log_path() {
        Some(path) => read_tail(&path, limit),
        None => Vec::new(),
    }
}

/// Read the last `limit` events of `path` without loading the whole file.
pub fn read_tail(path: &Path, limit: usize) -> Vec<PollEvent> {
    let Ok(mut file) = fs::File::open(path) else {
        return Vec::new();
    };
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    let start = len.saturating_sub(limit as u64 * TAIL_BYTES_PER_EVENT);
    if file.seek(SeekFrom::Start(start)).is_err() {
        return Vec::new();
    }

    let mut buf = Vec::new();
    if file.read_to_end(&mut buf).is_err() {
        return Vec::new();
    }
    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.lines();
    if start > 0 {
        // first line is cut mid-way
        lines.next();
    }

    let mut events: Vec<PollEvent> = lines
        .filter_map(|line| serde_json::from_str::<PollEvent>(line).ok())
        .collect();
    let excess = events.len().saturating_sub(limit);
    events.drain(..excess);
    events
}

pub fn read_events(path: &Path) -> Vec<PollEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<PollEvent>(&line).ok())
        .collect()
}

pub fn poll_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".oeeview").join("poll-log.jsonl"))
}
