//! `GET /api/oee-history`: a bare array of `{ date, shift, oee }` records,
//! one per shift that has run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::oee::parse_percent;
use super::parse_date;

/// The shifts the history chart draws a line for.
pub const SHIFTS: [&str; 2] = ["shift-1", "shift-2"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OeeHistoryRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default, deserialize_with = "optional_percent")]
    pub oee: Option<f64>,
}

/// Every shift's OEE on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OeeDay {
    pub date: NaiveDate,
    /// Axis label such as `"Jan 5"`.
    pub label: String,
    pub shifts: BTreeMap<String, f64>,
}

impl OeeDay {
    pub fn shift(&self, name: &str) -> Option<f64> {
        self.shifts.get(name).copied()
    }
}

/// Group records by day, oldest first.
///
/// A later record for the same day and shift replaces an earlier one.
/// Records without a readable date, a shift name or a numeric OEE are
/// skipped.
pub fn group_by_date(records: &[OeeHistoryRecord]) -> Vec<OeeDay> {
    let mut days: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
    for record in records {
        let shift = record.shift.trim();
        let (Some(date), Some(oee)) = (parse_date(&record.date), record.oee) else {
            continue;
        };
        if shift.is_empty() {
            continue;
        }
        days.entry(date).or_default().insert(shift.to_string(), oee);
    }

    days.into_iter()
        .map(|(date, shifts)| OeeDay {
            date,
            label: date.format("%b %-d").to_string(),
            shifts,
        })
        .collect()
}

/// Mean OEE of one shift over the days it ran.
pub fn shift_average(days: &[OeeDay], shift: &str) -> Option<f64> {
    let values: Vec<f64> = days.iter().filter_map(|d| d.shift(shift)).collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn optional_percent<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_percent(&s),
        _ => None,
    };
    Ok(parsed.filter(|n| n.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(json: &str) -> Vec<OeeHistoryRecord> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn groups_shifts_under_their_day_in_date_order() {
        let days = group_by_date(&records(
            r#"[
                {"date": "2025-01-06T00:00:00.000Z", "shift": "shift-1", "oee": "81.5"},
                {"date": "2025-01-05T00:00:00.000Z", "shift": "shift-2", "oee": 77},
                {"date": "2025-01-05T00:00:00.000Z", "shift": "shift-1", "oee": "70.25%"}
            ]"#,
        ));

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].label, "Jan 5");
        assert_eq!(days[0].shift("shift-1"), Some(70.25));
        assert_eq!(days[0].shift("shift-2"), Some(77.0));
        assert_eq!(days[1].label, "Jan 6");
        assert_eq!(days[1].shift("shift-2"), None);

        assert_eq!(shift_average(&days, "shift-1"), Some((70.25 + 81.5) / 2.0));
        assert_eq!(shift_average(&days, "shift-2"), Some(77.0));
        assert_eq!(shift_average(&days, "shift-3"), None);
    }

    #[test]
    fn later_record_replaces_earlier_for_same_shift() {
        let days = group_by_date(&records(
            r#"[
                {"date": "2025-03-01", "shift": "shift-1", "oee": 60},
                {"date": "2025-03-01", "shift": "shift-1", "oee": 65}
            ]"#,
        ));
        assert_eq!(days[0].shift("shift-1"), Some(65.0));
    }

    #[test]
    fn same_month_day_in_different_years_stays_apart() {
        let days = group_by_date(&records(
            r#"[
                {"date": "2025-01-05", "shift": "shift-1", "oee": 60},
                {"date": "2024-01-05", "shift": "shift-1", "oee": 50}
            ]"#,
        ));
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].shift("shift-1"), Some(50.0));
    }

    #[test]
    fn unusable_records_are_skipped() {
        let days = group_by_date(&records(
            r#"[
                {"date": "not a date", "shift": "shift-1", "oee": 60},
                {"date": "2025-03-01", "shift": "", "oee": 60},
                {"date": "2025-03-01", "shift": "shift-2", "oee": "n/a"},
                {"date": "2025-03-01", "shift": "shift-2"}
            ]"#,
        ));
        assert!(days.is_empty());
    }
}
