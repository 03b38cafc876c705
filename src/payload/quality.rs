//! `GET /api/monthly-stats`: per-part good counts and rejections by reason.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{PartSelection, lenient_f64};
use crate::pareto::{MeasurementRecord, ParetoTable, PartitionedInput, Selection};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthlyStats {
    /// Keyed by part name (e.g. `"BIG CYLINDER"`).
    #[serde(default)]
    pub stats: BTreeMap<String, PartStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartStats {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub good_count: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_rejections: f64,
    #[serde(default)]
    pub rejections_by_reason: Vec<RejectionReason>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectionReason {
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub count: f64,
}

impl PartStats {
    /// Rejections renamed into aggregator records. Reasons with no
    /// rejections are dropped before they reach the chart.
    pub fn rejection_records(&self) -> Vec<MeasurementRecord> {
        self.rejections_by_reason
            .iter()
            .filter(|r| r.count > 0.0)
            .map(|r| MeasurementRecord::new(r.reason.clone(), r.count))
            .collect()
    }
}

impl MonthlyStats {
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(String::as_str)
    }

    /// Look up a part by exact name, falling back to a case-insensitive match.
    pub fn part(&self, name: &str) -> Option<&PartStats> {
        self.stats.get(name).or_else(|| {
            self.stats
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, stats)| stats)
        })
    }

    /// Every part's rejection records, keyed by part name.
    pub fn partitioned_rejections(&self) -> PartitionedInput {
        self.stats
            .iter()
            .map(|(part, stats)| (part.clone(), stats.rejection_records()))
            .collect()
    }

    /// Ranked rejection analysis for a selection.
    ///
    /// A named part absent from the payload gives an empty table.
    pub fn rejection_pareto(&self, selection: &PartSelection) -> ParetoTable {
        match selection {
            PartSelection::AllParts => {
                let partitioned = self.partitioned_rejections();
                ParetoTable::from_selection(Selection::All(&partitioned))
            }
            PartSelection::Part(name) => {
                let records = self
                    .part(name)
                    .map(PartStats::rejection_records)
                    .unwrap_or_default();
                ParetoTable::from_selection(Selection::Single(&records))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "stats": {
            "BIG CYLINDER": {
                "goodCount": 410,
                "totalRejections": 12,
                "rejectionsByReason": [
                    { "reason": "blow hole", "count": 7 },
                    { "reason": "crack", "count": 5 },
                    { "reason": "dent", "count": 0 }
                ]
            },
            "SMALL CYLINDER": {
                "goodCount": 388,
                "totalRejections": 9,
                "rejectionsByReason": [
                    { "reason": "crack", "count": 6 },
                    { "reason": "porosity", "count": 3 }
                ]
            }
        }
    }"#;

    fn sample() -> MonthlyStats {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn zero_count_reasons_are_dropped() {
        let stats = sample();
        let records = stats.part("BIG CYLINDER").unwrap().rejection_records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.category != "dent"));
    }

    #[test]
    fn single_part_ranking() {
        let table = sample().rejection_pareto(&PartSelection::Part("SMALL CYLINDER".into()));
        let order: Vec<&str> = table.entries.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(order, ["crack", "porosity"]);
        assert_eq!(table.entries[0].cumulative_percent, 66.7);
    }

    #[test]
    fn all_parts_merges_reasons() {
        let table = sample().rejection_pareto(&PartSelection::AllParts);
        assert_eq!(table.entries[0].category, "crack");
        assert_eq!(table.entries[0].amount, 11.0);
        assert_eq!(table.total_amount, 21.0);
        assert_eq!(table.entries.last().unwrap().cumulative_percent, 100.0);
    }

    #[test]
    fn part_lookup_is_case_insensitive() {
        let stats = sample();
        assert!(stats.part("big cylinder").is_some());
        assert!(stats.part("GEAR").is_none());
    }

    #[test]
    fn unknown_part_gives_empty_table() {
        let table = sample().rejection_pareto(&PartSelection::Part("GEAR".into()));
        assert!(table.is_empty());
    }
}
