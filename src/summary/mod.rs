//! Headline figures shown above the Pareto charts.
//!
//! - **Availability**: run and stop time in hours
//! - **Quality**: good and rejected counts for a part or for every part
//! - **OEE gauges**: the backend's availability / performance / quality / OEE
//!   percentages

use serde::Serialize;

use crate::payload::{MonthlyStats, OeeData, PartSelection, RuntimeData};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AvailabilitySummary {
    pub run_hours: f64,
    pub stop_hours: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QualitySummary {
    pub good: f64,
    pub rejected: f64,
}

impl QualitySummary {
    /// Rejected share of everything produced, in percent. `0` when nothing
    /// was produced.
    pub fn rejection_pct(&self) -> f64 {
        let produced = self.good + self.rejected;
        if produced <= 0.0 {
            0.0
        } else {
            self.rejected / produced * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OeeGauges {
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub oee: f64,
}

/// Convert minutes to hours, rounded to two decimals.
pub fn minutes_to_hours(minutes: f64) -> f64 {
    (minutes / 60.0 * 100.0).round() / 100.0
}

pub fn availability(data: &RuntimeData) -> AvailabilitySummary {
    AvailabilitySummary {
        run_hours: minutes_to_hours(data.stats.actual_run_time),
        stop_hours: minutes_to_hours(data.stats.total_stop_time),
    }
}

/// Good/rejected counts for the selection; zeros for an unknown part.
pub fn quality(stats: &MonthlyStats, selection: &PartSelection) -> QualitySummary {
    match selection {
        PartSelection::AllParts => {
            stats
                .stats
                .values()
                .fold(QualitySummary::default(), |acc, part| QualitySummary {
                    good: acc.good + part.good_count,
                    rejected: acc.rejected + part.total_rejections,
                })
        }
        PartSelection::Part(name) => stats
            .part(name)
            .map(|part| QualitySummary {
                good: part.good_count,
                rejected: part.total_rejections,
            })
            .unwrap_or_default(),
    }
}

pub fn gauges(data: &OeeData) -> OeeGauges {
    OeeGauges {
        availability: data.availability,
        performance: data.performance,
        quality: data.quality,
        oee: data.oee,
    }
}
