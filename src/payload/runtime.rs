//! `GET /api/monthly-runtime`: stoppage durations by reason.

use serde::Deserialize;

use super::{lenient_f64, lenient_opt_f64};
use crate::pareto::{MeasurementRecord, ParetoTable, Selection};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeData {
    #[serde(default)]
    pub stats: RuntimeStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStats {
    #[serde(default)]
    pub stoppages_by_reason: Vec<StoppageReason>,
    /// Minutes the line actually ran this month.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub actual_run_time: f64,
    /// Minutes the line was stopped this month.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_stop_time: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoppageReason {
    #[serde(default)]
    pub reason: String,
    /// Stoppage minutes.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub occurrences: Option<f64>,
}

impl RuntimeData {
    /// Stoppages renamed into aggregator records (`reason → category`,
    /// `duration → amount`).
    pub fn stoppage_records(&self) -> Vec<MeasurementRecord> {
        self.stats
            .stoppages_by_reason
            .iter()
            .map(|s| MeasurementRecord {
                category: s.reason.clone(),
                amount: s.duration,
                occurrences: s.occurrences,
            })
            .collect()
    }

    /// Ranked stoppage analysis.
    pub fn stoppage_pareto(&self) -> ParetoTable {
        let records = self.stoppage_records();
        ParetoTable::from_selection(Selection::Single(&records))
    }
}
