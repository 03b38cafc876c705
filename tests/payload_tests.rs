/// Backend payload tests.
///
/// Feeds realistic `/api/*` response bodies through envelope parsing and the
/// normalization into ranked tables and headline summaries.
use oeeview::payload::history;
use oeeview::payload::{
    self, HourlyProduction, MonthlyStats, OeeData, OeeHistoryRecord, PartSelection, PlanActualRow,
    RuntimeData, ShiftPlan,
};
use oeeview::summary;

const RUNTIME_BODY: &str = r#"{
  "success": true,
  "data": {
    "stats": {
      "actualRunTime": 9000,
      "totalStopTime": "630",
      "stoppagesByReason": [
        {"reason": "tool change", "duration": 120, "occurrences": 4},
        {"reason": "power cut", "duration": 400, "occurrences": 1},
        {"reason": "no material", "duration": "80", "occurrences": null},
        {"reason": "operator absent", "duration": 30}
      ]
    }
  }
}"#;

const STATS_BODY: &str = r#"{
  "success": true,
  "data": {
    "stats": {
      "BIG CYLINDER": {
        "goodCount": 480,
        "totalRejections": 20,
        "rejectionsByReason": [
          {"reason": "blow hole", "count": 12},
          {"reason": "crack", "count": 8},
          {"reason": "dent", "count": 0}
        ]
      },
      "SMALL CYLINDER": {
        "goodCount": "290",
        "totalRejections": 10,
        "rejectionsByReason": [
          {"reason": "crack", "count": 7},
          {"reason": "porosity", "count": 3}
        ]
      }
    }
  }
}"#;

const OEE_BODY: &str = r#"{
  "success": true,
  "data": {"availability": "93.5%", "performance": "88%", "quality": 96.2, "oee": "79.1 %"}
}"#;

// ---------------------------------------------------------------------------
// Stoppages
// ---------------------------------------------------------------------------

#[test]
fn stoppage_payload_ranks_by_duration() {
    let data: RuntimeData = payload::parse_envelope(RUNTIME_BODY).unwrap();
    let table = data.stoppage_pareto();

    let order: Vec<&str> = table.entries.iter().map(|e| e.category.as_str()).collect();
    assert_eq!(order, vec!["power cut", "tool change", "no material", "operator absent"]);
    assert_eq!(table.total_amount, 630.0);
    assert_eq!(table.entries[0].cumulative_percent, 63.5);
    assert_eq!(table.entries[0].occurrences, Some(1.0));
    assert_eq!(table.entries[2].occurrences, None);
    assert_eq!(table.entries[3].cumulative_percent, 100.0);
}

#[test]
fn stoppage_summary_in_hours() {
    let data: RuntimeData = payload::parse_envelope(RUNTIME_BODY).unwrap();
    let a = summary::availability(&data);
    assert_eq!(a.run_hours, 150.0);
    assert_eq!(a.stop_hours, 10.5);
}

#[test]
fn empty_runtime_payload_renders_nothing() {
    let data: RuntimeData =
        payload::parse_envelope(r#"{"success": true, "data": {"stats": {}}}"#).unwrap();
    assert!(data.stoppage_pareto().is_empty());
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn rejections_for_one_part() {
    let stats: MonthlyStats = payload::parse_envelope(STATS_BODY).unwrap();
    let table = stats.rejection_pareto(&PartSelection::parse("BIG CYLINDER"));

    let order: Vec<&str> = table.entries.iter().map(|e| e.category.as_str()).collect();
    // zero-count reasons never reach the chart
    assert_eq!(order, vec!["blow hole", "crack"]);
    assert_eq!(table.entries[0].cumulative_percent, 60.0);
}

#[test]
fn rejections_merged_across_parts() {
    let stats: MonthlyStats = payload::parse_envelope(STATS_BODY).unwrap();
    let table = stats.rejection_pareto(&PartSelection::parse("all"));

    let ranked: Vec<(&str, f64)> = table
        .entries
        .iter()
        .map(|e| (e.category.as_str(), e.amount))
        .collect();
    assert_eq!(
        ranked,
        vec![("crack", 15.0), ("blow hole", 12.0), ("porosity", 3.0)]
    );
    assert_eq!(table.entries[0].cumulative_percent, 50.0);
    assert_eq!(table.entries[1].cumulative_percent, 90.0);
    assert_eq!(table.entries[2].cumulative_percent, 100.0);
}

#[test]
fn part_lookup_is_case_insensitive_and_unknown_is_empty() {
    let stats: MonthlyStats = payload::parse_envelope(STATS_BODY).unwrap();
    assert!(!stats.rejection_pareto(&PartSelection::parse("small cylinder")).is_empty());
    assert!(stats.rejection_pareto(&PartSelection::parse("GEAR")).is_empty());
}

#[test]
fn quality_summary_per_selection() {
    let stats: MonthlyStats = payload::parse_envelope(STATS_BODY).unwrap();

    let big = summary::quality(&stats, &PartSelection::parse("BIG CYLINDER"));
    assert_eq!(big.good, 480.0);
    assert_eq!(big.rejected, 20.0);
    assert_eq!(big.rejection_pct(), 4.0);

    let all = summary::quality(&stats, &PartSelection::AllParts);
    assert_eq!(all.good, 770.0);
    assert_eq!(all.rejected, 30.0);
}

// ---------------------------------------------------------------------------
// OEE gauges and envelope failures
// ---------------------------------------------------------------------------

#[test]
fn oee_percent_strings_are_parsed() {
    let data: OeeData = payload::parse_envelope(OEE_BODY).unwrap();
    let g = summary::gauges(&data);
    assert_eq!(g.availability, 93.5);
    assert_eq!(g.performance, 88.0);
    assert_eq!(g.quality, 96.2);
    assert_eq!(g.oee, 79.1);
}

#[test]
fn failed_envelope_is_an_error() {
    let err = payload::parse_envelope::<RuntimeData>(
        r#"{"success": false, "message": "database unavailable"}"#,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("database unavailable"));
    assert!(payload::parse_envelope::<RuntimeData>("<html>502</html>").is_err());
}

// ---------------------------------------------------------------------------
// Production and OEE history
// ---------------------------------------------------------------------------

const HOURLY_BODY: &str = r#"{
  "success": true,
  "hourlyProduction": {
    "BIG CYLINDER": {"06:00": 52, "06:30": 58, "07:00": 49, "07:30": "41"},
    "SMALL CYLINDER": {"06:10": 12, "07:05": 9, "14:00": 110}
  }
}"#;

#[test]
fn hourly_production_through_flat_envelope() {
    let data: HourlyProduction = payload::parse_flat_envelope(HOURLY_BODY).unwrap();
    let buckets = data.hourly_buckets(106.0);

    let busy: Vec<(&str, f64, bool)> = buckets
        .iter()
        .filter(|b| b.count > 0.0)
        .map(|b| (b.label.as_str(), b.count, b.meets_target))
        .collect();
    assert_eq!(
        busy,
        vec![("06", 122.0, true), ("07", 99.0, false), ("14", 110.0, true)]
    );
    assert_eq!(buckets.len(), 24);
}

#[test]
fn hourly_production_failure_is_an_error() {
    assert!(payload::parse_flat_envelope::<HourlyProduction>(r#"{"success": false}"#).is_err());
}

#[test]
fn recent_plan_actual_rows() {
    let rows: Vec<PlanActualRow> = payload::parse_envelope(
        r#"{"success": true, "data": [
            {"date": "2025-02-28T00:00:00.000Z", "shift": "shift-2", "plan": 450, "actual": 401}
        ]}"#,
    )
    .unwrap();
    assert_eq!(rows[0].label(), "28 Feb shift-2");
    assert_eq!(rows[0].actual, 401.0);
}

#[test]
fn shift_plan_response() {
    let plan: ShiftPlan =
        payload::parse_flat_envelope(r#"{"success": true, "plan": 480, "actual": 360}"#).unwrap();
    assert_eq!(plan.attainment_pct(), Some(75.0));
    assert_eq!(plan.to_string(), "plan 480 / actual 360");
}

#[test]
fn oee_history_sorted_by_day() {
    let records: Vec<OeeHistoryRecord> = serde_json::from_str(
        r#"[
          {"date": "2025-02-01T00:00:00.000Z", "shift": "shift-2", "oee": "62.4"},
          {"date": "2025-01-31T00:00:00.000Z", "shift": "shift-1", "oee": "71.0"},
          {"date": "2025-02-01T00:00:00.000Z", "shift": "shift-1", "oee": 68}
        ]"#,
    )
    .unwrap();
    let days = history::group_by_date(&records);

    let labels: Vec<&str> = days.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Jan 31", "Feb 1"]);
    assert_eq!(days[1].shift("shift-1"), Some(68.0));
    assert_eq!(days[1].shift("shift-2"), Some(62.4));
}
