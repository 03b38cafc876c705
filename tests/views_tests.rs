/// Polled view tests.
///
/// Runs views against a throwaway local backend served with `tiny_http`,
/// and against an unreachable address to check failure bookkeeping.
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use oeeview::client::ApiClient;
use oeeview::config::schema::{ApiConfig, PartInfo};
use oeeview::payload::{MonthlyStats, PartSelection};
use oeeview::views::{
    self, HealthView, HistoryView, OutputView, PolledView, RejectionView, RunningTimeView,
    StoppageView,
};
use tiny_http::{Header, Method, Response, Server};

const RUNTIME_BODY: &str = r#"{"success": true, "data": {"stats": {
    "actualRunTime": 600, "totalStopTime": 90,
    "stoppagesByReason": [
        {"reason": "setup", "duration": 30},
        {"reason": "breakdown", "duration": 60}
    ]}}}"#;

const STATS_BODY: &str = r#"{"success": true, "data": {"stats": {
    "P1": {"goodCount": 10, "totalRejections": 5, "rejectionsByReason": [
        {"reason": "X", "count": 4}, {"reason": "Y", "count": 1}]},
    "P2": {"goodCount": 20, "totalRejections": 9, "rejectionsByReason": [
        {"reason": "X", "count": 6}, {"reason": "Z", "count": 3}]}
}}}"#;

const HOURLY_BODY: &str = r#"{"success": true, "hourlyProduction": {
    "BIG CYLINDER": {"08:00": 70, "08:30": 40, "09:00": 30},
    "SMALL CYLINDER": {"09:15": 20}
}}"#;

const PLAN_ACTUAL_BODY: &str = r#"{"success": true, "data": [
    {"date": "2025-01-05T00:00:00.000Z", "shift": "shift-1", "plan": 500, "actual": 470},
    {"date": "2025-01-05T00:00:00.000Z", "shift": "shift-2", "plan": 500, "actual": 515}
]}"#;

const SHARES_BODY: &str = r#"{"BIG CYLINDER": 600, "SMALL CYLINDER": 200}"#;

const HISTORY_BODY: &str = r#"[
    {"date": "2025-01-06T00:00:00.000Z", "shift": "shift-1", "oee": "74.5"},
    {"date": "2025-01-05T00:00:00.000Z", "shift": "shift-1", "oee": "70"},
    {"date": "2025-01-05T00:00:00.000Z", "shift": "shift-2", "oee": "66.5"}
]"#;

/// Only this part has a shift planned.
const PLANNED_PART: &str = "9253020232";

/// Serve canned bodies by path on an ephemeral port. Returns the base URL
/// and a counter of requests answered.
fn fake_backend() -> (String, Arc<AtomicUsize>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut sent = String::new();
            let _ = request.as_reader().read_to_string(&mut sent);

            let (status, body) = match (request.method(), request.url()) {
                (Method::Get, "/api/monthly-runtime") => (200, RUNTIME_BODY),
                (Method::Get, "/api/monthly-stats") => (200, STATS_BODY),
                (Method::Get, "/api/hourly-production-data") => (200, HOURLY_BODY),
                (Method::Get, "/api/recent-plan-actual") => (200, PLAN_ACTUAL_BODY),
                (Method::Get, "/api/pie") => (200, SHARES_BODY),
                (Method::Get, "/api/oee-history") => (200, HISTORY_BODY),
                (Method::Get, "/api/production") => (200, r#"{"success": true}"#),
                (Method::Post, "/api/production") if sent.contains(PLANNED_PART) => {
                    (200, r#"{"success": true, "plan": 480, "actual": "120"}"#)
                }
                (Method::Post, "/api/production") => {
                    (404, r#"{"success": false, "message": "no shift planned"}"#)
                }
                _ => (200, r#"{"success": false, "message": "no such endpoint"}"#),
            };
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let _ = request.respond(
                Response::from_string(body)
                    .with_header(header)
                    .with_status_code(status),
            );
        }
    });

    (format!("http://{addr}"), hits)
}

fn part(number: &str) -> PartInfo {
    PartInfo {
        number: number.to_string(),
        name: "TEST PART".to_string(),
    }
}

fn client_for(base_url: &str) -> ApiClient {
    ApiClient::from_config(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_ms: 2_000,
        health_timeout_ms: 500,
    })
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    done()
}

// ---------------------------------------------------------------------------
// Single refresh
// ---------------------------------------------------------------------------

#[test]
fn refresh_populates_stoppage_view() {
    let (base, _) = fake_backend();
    let view = views::shared(StoppageView::new());

    views::refresh(&view, &client_for(&base), 1, false);

    let v = views::read(&view);
    assert!(v.freshness().has_data());
    assert_eq!(v.freshness().last_error, None);
    let order: Vec<&str> = v.pareto().entries.iter().map(|e| e.category.as_str()).collect();
    assert_eq!(order, vec!["breakdown", "setup"]);
    assert_eq!(v.pareto().entries[0].cumulative_percent, 66.7);
    assert_eq!(v.availability().run_hours, 10.0);
    assert_eq!(v.availability().stop_hours, 1.5);
}

#[test]
fn refresh_failure_keeps_previous_data() {
    let (base, _) = fake_backend();
    let view = views::shared(RejectionView::new(PartSelection::AllParts));
    views::refresh(&view, &client_for(&base), 1, false);
    assert_eq!(views::read(&view).pareto().entries.len(), 3);

    // nothing listens on the discard port
    views::refresh(&view, &client_for("http://127.0.0.1:9"), 2, false);

    let v = views::read(&view);
    assert!(v.freshness().last_error.is_some());
    assert_eq!(v.freshness().applied_seq, 1);
    assert_eq!(v.pareto().entries.len(), 3);
}

#[test]
fn stale_payload_never_overwrites_newer_one() {
    let (base, _) = fake_backend();
    let view = views::shared(RejectionView::new(PartSelection::AllParts));

    // tick 2 resolves first
    views::refresh(&view, &client_for(&base), 2, false);

    // tick 1 arrives late with different data
    let stale: MonthlyStats = serde_json::from_str(
        r#"{"stats": {"P1": {"rejectionsByReason": [{"reason": "old", "count": 99}]}}}"#,
    )
    .unwrap();
    assert!(!views::write(&view).apply(1, stale));

    let v = views::read(&view);
    assert_eq!(v.freshness().applied_seq, 2);
    assert_eq!(v.pareto().entries[0].category, "X");
}

// ---------------------------------------------------------------------------
// Polling lifecycle
// ---------------------------------------------------------------------------

#[test]
fn watch_refreshes_until_dropped() {
    let (base, hits) = fake_backend();
    let view = views::shared(StoppageView::new());

    let poller = views::watch(
        view.clone(),
        client_for(&base),
        Duration::from_millis(20),
        false,
    )
    .unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        views::read(&view).freshness().applied_seq >= 3
    }));
    drop(poller);

    let after_stop = hits.load(Ordering::SeqCst);
    let seq_after_stop = views::read(&view).freshness().applied_seq;
    thread::sleep(Duration::from_millis(150));
    assert_eq!(hits.load(Ordering::SeqCst), after_stop);
    assert_eq!(views::read(&view).freshness().applied_seq, seq_after_stop);
}

#[test]
fn views_do_not_share_state() {
    let (base, _) = fake_backend();
    let client = client_for(&base);
    let merged = views::shared(RejectionView::new(PartSelection::AllParts));
    let single = views::shared(RejectionView::new(PartSelection::parse("P2")));

    views::refresh(&merged, &client, 1, false);
    views::refresh(&single, &client, 1, false);

    assert_eq!(views::read(&merged).pareto().total_amount, 14.0);
    assert_eq!(views::read(&single).pareto().total_amount, 9.0);

    views::write(&single).select(PartSelection::parse("P1"));
    assert_eq!(views::read(&single).pareto().total_amount, 5.0);
    assert_eq!(views::read(&merged).pareto().total_amount, 14.0);
}

// ---------------------------------------------------------------------------
// Production and history views
// ---------------------------------------------------------------------------

#[test]
fn running_time_view_buckets_hourly_output() {
    let (base, _) = fake_backend();
    let view = views::shared(RunningTimeView::new(106.0));

    views::refresh(&view, &client_for(&base), 1, false);

    let v = views::read(&view);
    assert_eq!(v.freshness().last_error, None);
    assert_eq!(v.buckets().len(), 24);
    assert_eq!(v.buckets()[8].count, 110.0);
    assert!(v.buckets()[8].meets_target);
    assert_eq!(v.buckets()[9].count, 50.0);
    assert!(!v.buckets()[9].meets_target);
    assert_eq!(v.produced_today(), 160.0);

    let labels: Vec<String> = v.plan_actual().iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["5 Jan shift-1", "5 Jan shift-2"]);
}

#[test]
fn history_view_groups_by_day() {
    let (base, _) = fake_backend();
    let view = views::shared(HistoryView::new());

    views::refresh(&view, &client_for(&base), 1, false);

    let v = views::read(&view);
    let labels: Vec<&str> = v.days().iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Jan 5", "Jan 6"]);
    assert_eq!(v.days()[0].shift("shift-2"), Some(66.5));
    assert_eq!(v.days()[1].shift("shift-2"), None);
}

#[test]
fn output_view_posts_the_part_number() {
    let (base, _) = fake_backend();
    let client = client_for(&base);

    let planned = views::shared(OutputView::new(Some(part(PLANNED_PART))));
    views::refresh(&planned, &client, 1, false);
    let v = views::read(&planned);
    assert_eq!(v.shift_plan().plan, Some(480.0));
    assert_eq!(v.shift_plan().actual, Some(120.0));
    assert_eq!(v.shift_plan().attainment_pct(), Some(25.0));
    assert_eq!(v.shares()[0].percent, 75.0);
    drop(v);

    // an error status means no shift is planned, not a failed poll
    let unplanned = views::shared(OutputView::new(Some(part("0000000000"))));
    views::refresh(&unplanned, &client, 1, false);
    let v = views::read(&unplanned);
    assert_eq!(v.freshness().last_error, None);
    assert!(v.shift_plan().is_nil());
    assert_eq!(v.shift_plan().plan_display(), "NIL");
    assert_eq!(v.shares().len(), 2);
}

#[test]
fn output_view_failure_keeps_previous_plan() {
    let (base, _) = fake_backend();
    let view = views::shared(OutputView::new(Some(part(PLANNED_PART))));
    views::refresh(&view, &client_for(&base), 1, false);

    views::refresh(&view, &client_for("http://127.0.0.1:9"), 2, false);

    let v = views::read(&view);
    assert!(v.freshness().last_error.is_some());
    assert_eq!(v.shift_plan().plan, Some(480.0));
}

#[test]
fn health_view_caches_backend_state() {
    let (base, hits) = fake_backend();
    let view = views::shared(HealthView::new());

    views::refresh(&view, &client_for(&base), 1, false);
    assert_eq!(views::read(&view).online(), Some(true));
    let after_check = hits.load(Ordering::SeqCst);

    // reading the cached state never reaches the backend
    for _ in 0..5 {
        assert_eq!(views::read(&view).online(), Some(true));
    }
    assert_eq!(hits.load(Ordering::SeqCst), after_check);

    views::refresh(&view, &client_for("http://127.0.0.1:9"), 2, false);
    assert_eq!(views::read(&view).online(), Some(false));
}
