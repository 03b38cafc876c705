//! Backend payload shapes and their normalization into Pareto records.
//!
//! Most OEE backend responses are wrapped in `{ "success": bool, "data": ... }`.
//! A few endpoints put their fields next to `success` instead
//! ([`parse_flat_envelope`]) or return a bare value.
//! Numeric fields are parsed leniently: a number, a numeric string, `null`
//! or a missing key all deserialize, and anything unusable becomes `0` so a
//! partially populated payload still renders.

pub mod history;
pub mod oee;
pub mod production;
pub mod quality;
pub mod runtime;

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub use history::{OeeDay, OeeHistoryRecord};
pub use oee::OeeData;
pub use production::{
    HourlyBucket, HourlyProduction, PartShare, PlanActualRow, ProductionShares, ShiftPlan,
};
pub use quality::{MonthlyStats, PartStats, RejectionReason};
pub use runtime::{RuntimeData, RuntimeStats, StoppageReason};

/// Label of the virtual "every part" selection shown in the dashboard.
pub const ALL_PARTS_LABEL: &str = "ANALYSIS FOR PARTS";

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The `{ success, data }` wrapper around every backend response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, failing on `success: false` or missing `data`.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            anyhow::bail!(
                "unexpected API response: {}",
                self.message.as_deref().unwrap_or("success flag not set")
            );
        }
        self.data.context("unexpected API response: missing data")
    }
}

/// Parse a full envelope from raw JSON text.
pub fn parse_envelope<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    let envelope: Envelope<T> =
        serde_json::from_str(text).context("failed to parse API response JSON")?;
    envelope.into_data()
}

/// `{ "success": bool, ...fields }`: the payload sits beside the flag.
#[derive(Debug, Deserialize)]
struct FlatEnvelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    body: T,
}

/// Parse a response whose fields sit next to `success` rather than under
/// `data`.
pub fn parse_flat_envelope<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    let envelope: FlatEnvelope<T> =
        serde_json::from_str(text).context("failed to parse API response JSON")?;
    if !envelope.success {
        anyhow::bail!(
            "unexpected API response: {}",
            envelope.message.as_deref().unwrap_or("success flag not set")
        );
    }
    Ok(envelope.body)
}

/// Parse a saved payload that may or may not still carry its envelope.
///
/// An object with a `success` key is treated as an envelope; anything else
/// is deserialized as the bare `data` value.
pub fn parse_payload<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text).context("failed to parse payload JSON")?;
    if value.get("success").is_some() {
        let envelope: Envelope<T> =
            serde_json::from_value(value).context("failed to parse API response JSON")?;
        return envelope.into_data();
    }
    serde_json::from_value(value).context("payload does not match the expected shape")
}

// ---------------------------------------------------------------------------
// Part selection
// ---------------------------------------------------------------------------

/// Which part's rejections a quality view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartSelection {
    /// Merge every part before ranking.
    #[default]
    AllParts,
    /// A single named part, as keyed in the monthly stats payload.
    Part(String),
}

impl PartSelection {
    /// Parse a user-supplied selection. `all`, `both` and the dashboard's
    /// "ANALYSIS FOR PARTS" label (any case) select every part.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if trimmed.is_empty()
            || matches!(lower.as_str(), "all" | "both" | "*")
            || lower == ALL_PARTS_LABEL.to_ascii_lowercase()
        {
            Self::AllParts
        } else {
            Self::Part(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::AllParts => ALL_PARTS_LABEL,
            Self::Part(name) => name,
        }
    }
}

impl fmt::Display for PartSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Lenient numbers
// ---------------------------------------------------------------------------

/// Deserialize any JSON value into an `f64`, falling back to `0`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value).unwrap_or(0.0))
}

/// Like [`lenient_f64`] but keeps absence (`null`, missing, non-numeric) as
/// `None`.
pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Calendar date of a backend timestamp: RFC 3339 (taken in UTC), a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, or a plain `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
