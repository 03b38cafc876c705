//! Pareto aggregation: ranking categories by contribution.
//!
//! Turns categorized measurements (stoppage minutes per reason, rejection
//! counts per reason) into a ranked sequence with running totals and
//! cumulative percentages. The same sequence drives the bar + cumulative
//! line chart and the analysis table, so both always show identical numbers.
//!
//! - [`rank_by_contribution`]: sort descending, accumulate, compute percent
//! - [`merge_by_category`]: sum per-partition records sharing a category
//! - [`build_pareto_view`]: pick the single or merged path for a selection

mod selection;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub use selection::{ParetoTable, Selection, build_pareto_view};

/// Default cumulative-percent cut for the "vital few" categories.
pub const VITAL_FEW_THRESHOLD: f64 = 80.0;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One categorized measurement fed into the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Grouping label: a stoppage reason or a rejection reason.
    pub category: String,
    /// Minutes of stoppage or number of rejections. Expected to be `>= 0`.
    pub amount: f64,
    /// Auxiliary count carried through unchanged; never ranked on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<f64>,
}

impl MeasurementRecord {
    pub fn new(category: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            amount,
            occurrences: None,
        }
    }

    pub fn with_occurrences(mut self, occurrences: f64) -> Self {
        self.occurrences = Some(occurrences);
        self
    }
}

/// Records grouped under a secondary key (e.g. part name).
///
/// A `BTreeMap` keeps the merge's encounter order deterministic.
pub type PartitionedInput = BTreeMap<String, Vec<MeasurementRecord>>;

/// One row of a ranked Pareto sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub category: String,
    pub amount: f64,
    /// Sum of `amount` over this entry and every higher-ranked entry.
    pub running_total: f64,
    /// `running_total / total * 100`, rounded to one decimal; `0` when the
    /// total is zero.
    pub cumulative_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<f64>,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank records by `amount` descending and attach running totals and
/// cumulative percentages.
///
/// The input slice is never modified. Ties keep their input order (the sort
/// is stable). Amounts that are NaN, infinite or negative count as `0`, so a
/// partially populated backend payload still renders.
///
/// The grand total is summed in ranked order, which makes the last entry's
/// running total bitwise equal to it and its percentage exactly `100.0`.
///
/// Finite amounts can still sum past `f64::MAX`. In that case every amount
/// is divided by the largest one before accumulating, so percentages stay
/// finite and monotone; running totals are reported saturated at `f64::MAX`.
pub fn rank_by_contribution(records: &[MeasurementRecord]) -> Vec<RankedEntry> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<(&MeasurementRecord, f64)> = records
        .iter()
        .map(|r| (r, sanitize_amount(r.amount)))
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let raw_total: f64 = sorted.iter().map(|&(_, amount)| amount).sum();
    // dividing by 1.0 is exact, so the common case is untouched
    let scale = if raw_total.is_finite() { 1.0 } else { sorted[0].1 };
    let total: f64 = sorted.iter().map(|&(_, amount)| amount / scale).sum();

    let mut running = 0.0;
    sorted
        .into_iter()
        .map(|(record, amount)| {
            running += amount / scale;
            let cumulative_percent = if total > 0.0 {
                round1(running / total * 100.0)
            } else {
                0.0
            };

            RankedEntry {
                category: record.category.clone(),
                amount,
                running_total: (running * scale).min(f64::MAX),
                cumulative_percent,
                occurrences: record.occurrences,
            }
        })
        .collect()
}

/// Flatten all partitions and sum `amount` per category.
///
/// `occurrences` survives the merge only when every contributing record
/// carries it. Output follows first-encounter order, which the ranking step
/// discards anyway.
pub fn merge_by_category(partitioned: &PartitionedInput) -> Vec<MeasurementRecord> {
    let mut merged: Vec<MeasurementRecord> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in partitioned.values().flatten() {
        let amount = sanitize_amount(record.amount);

        match index.get(record.category.as_str()) {
            Some(&i) => {
                let slot = &mut merged[i];
                slot.amount += amount;
                slot.occurrences = match (slot.occurrences, record.occurrences) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                };
            }
            None => {
                index.insert(record.category.as_str(), merged.len());
                merged.push(MeasurementRecord {
                    category: record.category.clone(),
                    amount,
                    occurrences: record.occurrences,
                });
            }
        }
    }

    merged
}

/// Round half away from zero to one decimal place.
///
/// Idempotent on values that are already at one decimal.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Total of all (sanitized) amounts in a ranked or raw sequence.
pub fn total_amount(records: &[MeasurementRecord]) -> f64 {
    records.iter().map(|r| sanitize_amount(r.amount)).sum()
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
