//! JSON API handlers for the web dashboard.
//!
//! Handlers only read the polled views; none of them call the backend.
//! `/api/health` reports the latest result of the health poller.

use std::io::Cursor;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use super::{Dashboard, content_type_json};
use crate::pareto::{ParetoTable, RankedEntry, VITAL_FEW_THRESHOLD};
use crate::payload::history::SHIFTS;
use crate::payload::{HourlyBucket, OeeDay, PartSelection, PartShare};
use crate::summary::{AvailabilitySummary, OeeGauges, QualitySummary};
use crate::views::{self, Freshness, PolledView};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Ranked table plus its "vital few" head, as drawn by the chart and table.
#[derive(Serialize)]
struct ParetoResponse<'a> {
    total_amount: f64,
    entries: &'a [RankedEntry],
    vital_few: Vec<&'a str>,
}

impl<'a> ParetoResponse<'a> {
    fn from_table(table: &'a ParetoTable) -> Self {
        Self {
            total_amount: table.total_amount,
            entries: &table.entries,
            vital_few: table
                .vital_few(VITAL_FEW_THRESHOLD)
                .iter()
                .map(|e| e.category.as_str())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct StoppagesResponse<'a> {
    pareto: ParetoResponse<'a>,
    availability: AvailabilitySummary,
    freshness: &'a Freshness,
}

#[derive(Serialize)]
struct RejectionsResponse<'a> {
    part: &'a str,
    part_number: Option<&'a str>,
    pareto: ParetoResponse<'a>,
    quality: QualitySummary,
    freshness: &'a Freshness,
}

#[derive(Serialize)]
struct SummaryResponse<'a> {
    part: &'a str,
    availability: AvailabilitySummary,
    quality: QualitySummary,
    rejection_pct: f64,
    gauges: OeeGauges,
}

#[derive(Serialize)]
struct PartsResponse {
    parts: Vec<PartOption>,
}

#[derive(Serialize)]
struct PartOption {
    name: String,
    number: Option<String>,
}

#[derive(Serialize)]
struct RunningTimeResponse<'a> {
    target: f64,
    produced_today: f64,
    buckets: &'a [HourlyBucket],
    plan_actual: Vec<PlanActualPoint>,
    freshness: &'a Freshness,
}

#[derive(Serialize)]
struct PlanActualPoint {
    label: String,
    plan: f64,
    actual: f64,
}

#[derive(Serialize)]
struct OeeHistoryResponse<'a> {
    shifts: [&'static str; 2],
    days: &'a [OeeDay],
    freshness: &'a Freshness,
}

#[derive(Serialize)]
struct OutputResponse<'a> {
    part: Option<&'a str>,
    part_number: Option<&'a str>,
    /// A count, or `"NIL"` when the backend has none.
    plan: String,
    actual: String,
    attainment_pct: Option<f64>,
    shares: &'a [PartShare],
    freshness: &'a Freshness,
}

#[derive(Serialize)]
struct HealthResponse {
    backend_url: String,
    /// `None` until the first health check completes.
    backend_online: Option<bool>,
    checked_at: Option<DateTime<Utc>>,
    poll_interval_secs: u64,
    health_interval_secs: u64,
    views: Vec<ViewHealth>,
}

#[derive(Serialize)]
struct ViewHealth {
    name: &'static str,
    freshness: Freshness,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Extract a decoded query parameter from a URL.
pub(crate) fn query_param(url: &str, key: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| percent_decode(v))
    })
}

/// Decode `+` and `%XX` escapes. Malformed escapes are kept literally.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Part selection from `?part=`, falling back to the configured default.
fn selection_from(dashboard: &Dashboard, url: &str) -> PartSelection {
    let raw = query_param(url, "part")
        .unwrap_or_else(|| dashboard.config.parts.default_selection.clone());
    PartSelection::parse(&raw)
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/pareto/stoppages`
pub fn get_stoppages(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let view = views::read(&dashboard.stoppages);
    json_response(&StoppagesResponse {
        pareto: ParetoResponse::from_table(view.pareto()),
        availability: view.availability(),
        freshness: view.freshness(),
    })
}

/// `GET /api/pareto/rejections?part=NAME|all`
pub fn get_rejections(dashboard: &Dashboard, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let selection = selection_from(dashboard, url);
    let view = views::read(&dashboard.rejections);
    let (table, quality) = view.pareto_for(&selection);

    json_response(&RejectionsResponse {
        part: selection.label(),
        part_number: dashboard.config.parts.number_for(selection.label()),
        pareto: ParetoResponse::from_table(&table),
        quality,
        freshness: view.freshness(),
    })
}

/// `GET /api/summary?part=NAME|all`: availability, quality and OEE gauges.
pub fn get_summary(dashboard: &Dashboard, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let selection = selection_from(dashboard, url);
    let availability = views::read(&dashboard.stoppages).availability();
    let (_, quality) = views::read(&dashboard.rejections).pareto_for(&selection);
    let gauges = views::read(&dashboard.gauges).gauges();

    json_response(&SummaryResponse {
        part: selection.label(),
        availability,
        quality,
        rejection_pct: quality.rejection_pct(),
        gauges,
    })
}

/// `GET /api/parts`: parts seen in the latest payload plus configured ones.
pub fn get_parts(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let mut names = views::read(&dashboard.rejections).part_names();
    for known in &dashboard.config.parts.known {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&known.name)) {
            names.push(known.name.clone());
        }
    }

    let parts = names
        .into_iter()
        .map(|name| PartOption {
            number: dashboard.config.parts.number_for(&name).map(str::to_string),
            name,
        })
        .collect();

    json_response(&PartsResponse { parts })
}

/// `GET /api/running-time`: hourly output bars and recent plan vs actual.
pub fn get_running_time(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let view = views::read(&dashboard.running_time);
    let plan_actual = view
        .plan_actual()
        .iter()
        .map(|row| PlanActualPoint {
            label: row.label(),
            plan: row.plan,
            actual: row.actual,
        })
        .collect();

    json_response(&RunningTimeResponse {
        target: view.target(),
        produced_today: view.produced_today(),
        buckets: view.buckets(),
        plan_actual,
        freshness: view.freshness(),
    })
}

/// `GET /api/oee-history`: OEE per shift, one row per day, oldest first.
pub fn get_oee_history(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let view = views::read(&dashboard.history);
    json_response(&OeeHistoryResponse {
        shifts: SHIFTS,
        days: view.days(),
        freshness: view.freshness(),
    })
}

/// `GET /api/output`: production share per part and the shift's plan.
pub fn get_output(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let view = views::read(&dashboard.output);
    let plan = view.shift_plan();
    json_response(&OutputResponse {
        part: view.part().map(|p| p.name.as_str()),
        part_number: view.part().map(|p| p.number.as_str()),
        plan: plan.plan_display(),
        actual: plan.actual_display(),
        attainment_pct: plan.attainment_pct(),
        shares: view.shares(),
        freshness: view.freshness(),
    })
}

/// `GET /api/health`: cached backend reachability and per-view freshness.
pub fn get_health(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let view_states = vec![
        view_health(&dashboard.stoppages),
        view_health(&dashboard.rejections),
        view_health(&dashboard.gauges),
        view_health(&dashboard.running_time),
        view_health(&dashboard.history),
        view_health(&dashboard.output),
    ];
    let health = views::read(&dashboard.health);

    json_response(&HealthResponse {
        backend_url: dashboard.client.base_url().to_string(),
        backend_online: health.online(),
        checked_at: health.checked_at(),
        poll_interval_secs: dashboard.config.poll.interval_secs,
        health_interval_secs: dashboard.config.poll.health_interval_secs,
        views: view_states,
    })
}

fn view_health<V: PolledView>(view: &views::Shared<V>) -> ViewHealth {
    let guard = views::read(view);
    ViewHealth {
        name: guard.name(),
        freshness: guard.freshness().clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pareto::{MeasurementRecord, Selection};

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/api/summary?part=all", "part").as_deref(), Some("all"));
        assert_eq!(
            query_param("/api/x?foo=1&part=BIG+CYLINDER", "part").as_deref(),
            Some("BIG CYLINDER")
        );
        assert_eq!(
            query_param("/api/x?part=SMALL%20CYLINDER", "part").as_deref(),
            Some("SMALL CYLINDER")
        );
    }

    #[test]
    fn query_param_missing() {
        assert_eq!(query_param("/api/summary", "part"), None);
        assert_eq!(query_param("/api/summary?foo=bar", "part"), None);
    }

    #[test]
    fn percent_decode_keeps_malformed_escapes() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("a%2Fb"), "a/b");
    }

    #[test]
    fn pareto_response_lists_vital_few() {
        let table = ParetoTable::from_selection(Selection::Single(&[
            MeasurementRecord::new("a", 70.0),
            MeasurementRecord::new("b", 20.0),
            MeasurementRecord::new("c", 10.0),
        ]));
        let json = serde_json::to_value(ParetoResponse::from_table(&table)).unwrap();
        assert_eq!(json["vital_few"], serde_json::json!(["a", "b"]));
        assert_eq!(json["entries"][2]["cumulative_percent"], 100.0);
        assert_eq!(json["total_amount"], 100.0);
    }
}
