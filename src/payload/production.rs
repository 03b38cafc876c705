//! Production counts: hourly output, plan against actual per shift, each
//! part's share of output, and the current shift's plan for one part.
//!
//! - `GET /api/hourly-production-data` answers `{ success, hourlyProduction }`
//!   with counts keyed by part, then by `HH:MM` time.
//! - `GET /api/recent-plan-actual` answers the usual `{ success, data }`.
//! - `GET /api/pie` answers a bare `{ "<part>": count }` object.
//! - `POST /api/production` with `{ partNumber }` answers
//!   `{ success, plan, actual }`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{lenient_f64, lenient_opt_f64, number_from_value, parse_date};
use crate::pareto::round1;

/// Hours in a production day; the hourly chart always has this many bars.
pub const HOURS_PER_DAY: u8 = 24;

// ---------------------------------------------------------------------------
// Hourly production
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyProduction {
    /// Part name, then `HH:MM` slot, then units produced in that slot.
    #[serde(
        rename = "hourlyProduction",
        default,
        deserialize_with = "lenient_counts"
    )]
    pub by_part: BTreeMap<String, BTreeMap<String, f64>>,
}

/// One bar of the running-time chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBucket {
    pub hour: u8,
    /// Zero-padded hour, as shown on the chart axis.
    pub label: String,
    pub count: f64,
    pub meets_target: bool,
}

impl HourlyProduction {
    /// Sum every part's slots into one bucket per hour of the day.
    ///
    /// Slots whose hour is not `0..=23` are ignored and negative counts
    /// count as zero. Hours with no slot are present with a count of `0`.
    pub fn hourly_buckets(&self, target: f64) -> Vec<HourlyBucket> {
        let mut totals = [0.0_f64; HOURS_PER_DAY as usize];
        for slots in self.by_part.values() {
            for (time, &count) in slots {
                if let Some(hour) = slot_hour(time) {
                    totals[usize::from(hour)] += count.max(0.0);
                }
            }
        }

        (0..HOURS_PER_DAY)
            .map(|hour| {
                let count = totals[usize::from(hour)];
                HourlyBucket {
                    hour,
                    label: format!("{hour:02}"),
                    count,
                    meets_target: count >= target,
                }
            })
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.by_part
            .values()
            .flat_map(|slots| slots.values())
            .map(|count| count.max(0.0))
            .sum()
    }
}

/// Hour of a `HH:MM` (or bare `HH`) slot key.
fn slot_hour(time: &str) -> Option<u8> {
    let hour: u8 = time.split(':').next()?.trim().parse().ok()?;
    (hour < HOURS_PER_DAY).then_some(hour)
}

fn lenient_counts<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, BTreeMap<String, f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, BTreeMap<String, Value>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(part, slots)| {
            let slots = slots
                .into_iter()
                .filter_map(|(time, v)| number_from_value(&v).map(|n| (time, n)))
                .collect();
            (part, slots)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Plan against actual
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlanActualRow {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub plan: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub actual: f64,
}

impl PlanActualRow {
    /// Axis label such as `"5 Jan shift-1"`. An unparsable date is shown
    /// as sent.
    pub fn label(&self) -> String {
        let day = parse_date(&self.date)
            .map(|d| d.format("%-d %b").to_string())
            .unwrap_or_else(|| self.date.trim().to_string());
        match (day.is_empty(), self.shift.trim()) {
            (_, "") => day,
            (true, shift) => shift.to_string(),
            (false, shift) => format!("{day} {shift}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Production share
// ---------------------------------------------------------------------------

/// `{ "<part>": units }`; entries that are not numbers are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct ProductionShares {
    pub counts: BTreeMap<String, f64>,
}

impl From<BTreeMap<String, Value>> for ProductionShares {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let counts = raw
            .into_iter()
            .filter_map(|(part, v)| number_from_value(&v).map(|n| (part, n.max(0.0))))
            .collect();
        Self { counts }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartShare {
    pub part: String,
    pub count: f64,
    /// Share of all parts' output, one decimal. `0` when nothing was made.
    pub percent: f64,
}

impl ProductionShares {
    pub fn total(&self) -> f64 {
        self.counts.values().sum()
    }

    pub fn shares(&self) -> Vec<PartShare> {
        let total = self.total();
        self.counts
            .iter()
            .map(|(part, &count)| PartShare {
                part: part.clone(),
                count,
                percent: if total > 0.0 {
                    round1(count / total * 100.0)
                } else {
                    0.0
                },
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Shift plan for one part
// ---------------------------------------------------------------------------

/// Plan and actual units for the running shift. `None` shows as `NIL`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ShiftPlan {
    #[serde(default, deserialize_with = "positive_count")]
    pub plan: Option<f64>,
    #[serde(default, deserialize_with = "positive_count")]
    pub actual: Option<f64>,
}

/// Placeholder shown when a figure is unavailable.
pub const NIL: &str = "NIL";

impl ShiftPlan {
    pub fn nil() -> Self {
        Self::default()
    }

    pub fn is_nil(&self) -> bool {
        self.plan.is_none() && self.actual.is_none()
    }

    /// Actual as a percentage of plan, capped at 100. `None` unless both
    /// figures are present.
    pub fn attainment_pct(&self) -> Option<f64> {
        let (plan, actual) = (self.plan?, self.actual?);
        Some(round1((actual / plan * 100.0).min(100.0)))
    }

    pub fn plan_display(&self) -> String {
        display_count(self.plan)
    }

    pub fn actual_display(&self) -> String {
        display_count(self.actual)
    }
}

impl fmt::Display for ShiftPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plan {} / actual {}", self.plan_display(), self.actual_display())
    }
}

fn display_count(value: Option<f64>) -> String {
    value.map_or_else(|| NIL.to_string(), |n| format!("{n}"))
}

/// A zero, missing or non-numeric count is unavailable.
fn positive_count<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.filter(|n| *n > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(json: &str) -> HourlyProduction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn buckets_sum_parts_and_pad_the_day() {
        let data = hourly(
            r#"{"hourlyProduction": {
                "BIG CYLINDER": {"08:00": 60, "08:30": 50, "09:00": "40"},
                "SMALL CYLINDER": {"08:15": 10, "23:00": 120}
            }}"#,
        );
        let buckets = data.hourly_buckets(106.0);

        assert_eq!(buckets.len(), 24);
        assert_eq!(buckets[0].label, "00");
        assert_eq!(buckets[0].count, 0.0);
        assert_eq!(buckets[8].count, 120.0);
        assert!(buckets[8].meets_target);
        assert_eq!(buckets[9].count, 40.0);
        assert!(!buckets[9].meets_target);
        assert_eq!(buckets[23].label, "23");
        assert!(buckets[23].meets_target);
        assert_eq!(data.total(), 280.0);
    }

    #[test]
    fn buckets_ignore_bad_slots() {
        let data = hourly(
            r#"{"hourlyProduction": {"P": {
                "24:00": 5, "noon": 5, "7": 3, "07:45": -4, "10:00": null
            }}}"#,
        );
        let buckets = data.hourly_buckets(1.0);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<f64>(), 3.0);
        assert_eq!(buckets[7].count, 3.0);
    }

    #[test]
    fn missing_hourly_data_is_an_empty_day() {
        let buckets = hourly("{}").hourly_buckets(106.0);
        assert_eq!(buckets.len(), 24);
        assert!(buckets.iter().all(|b| b.count == 0.0 && !b.meets_target));
    }

    #[test]
    fn plan_actual_labels() {
        let row: PlanActualRow = serde_json::from_str(
            r#"{"date": "2025-01-05T00:00:00.000Z", "shift": "shift-1", "plan": "500", "actual": 430}"#,
        )
        .unwrap();
        assert_eq!(row.label(), "5 Jan shift-1");
        assert_eq!(row.plan, 500.0);

        let odd = PlanActualRow {
            date: "yesterday".into(),
            shift: String::new(),
            ..PlanActualRow::default()
        };
        assert_eq!(odd.label(), "yesterday");
    }

    #[test]
    fn shares_skip_non_numbers() {
        let shares: ProductionShares = serde_json::from_str(
            r#"{"BIG CYLINDER": 300, "SMALL CYLINDER": "100", "updatedAt": "today"}"#,
        )
        .unwrap();
        let rows = shares.shares();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].part, "BIG CYLINDER");
        assert_eq!(rows[0].percent, 75.0);
        assert_eq!(rows[1].percent, 25.0);
    }

    #[test]
    fn shares_of_nothing_are_zero() {
        let shares: ProductionShares = serde_json::from_str(r#"{"A": 0, "B": 0}"#).unwrap();
        assert!(shares.shares().iter().all(|s| s.percent == 0.0));
    }

    #[test]
    fn shift_plan_zero_means_nil() {
        let plan: ShiftPlan = serde_json::from_str(r#"{"plan": 0, "actual": null}"#).unwrap();
        assert!(plan.is_nil());
        assert_eq!(plan.plan_display(), "NIL");
        assert_eq!(plan.attainment_pct(), None);
    }

    #[test]
    fn attainment_is_capped() {
        let under = ShiftPlan { plan: Some(400.0), actual: Some(300.0) };
        assert_eq!(under.attainment_pct(), Some(75.0));
        let over = ShiftPlan { plan: Some(400.0), actual: Some(520.0) };
        assert_eq!(over.attainment_pct(), Some(100.0));
        let half = ShiftPlan { plan: Some(400.0), actual: None };
        assert_eq!(half.attainment_pct(), None);
        assert_eq!(half.to_string(), "plan 400 / actual NIL");
    }
}
