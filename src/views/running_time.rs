use anyhow::Result;

use super::{Freshness, PolledView, keep_ok};
use crate::client::ApiClient;
use crate::payload::{HourlyBucket, HourlyProduction, PlanActualRow};

/// Hourly output against the per-hour target, plus recent plan against
/// actual per shift.
#[derive(Debug, Clone, Default)]
pub struct RunningTimeView {
    target: f64,
    hourly: Option<HourlyProduction>,
    buckets: Vec<HourlyBucket>,
    plan_actual: Vec<PlanActualRow>,
    freshness: Freshness,
}

/// One tick's responses. A side that failed is `None` and leaves the
/// previous data in place.
#[derive(Debug, Default)]
pub struct RunningTimeData {
    pub hourly: Option<HourlyProduction>,
    pub plan_actual: Option<Vec<PlanActualRow>>,
}

impl RunningTimeView {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// 24 hourly bars; empty until the first successful fetch.
    pub fn buckets(&self) -> &[HourlyBucket] {
        &self.buckets
    }

    pub fn plan_actual(&self) -> &[PlanActualRow] {
        &self.plan_actual
    }

    pub fn produced_today(&self) -> f64 {
        self.hourly.as_ref().map_or(0.0, HourlyProduction::total)
    }
}

impl PolledView for RunningTimeView {
    type Data = RunningTimeData;
    type Query = ();

    fn name(&self) -> &'static str {
        "running-time"
    }

    fn query(&self) {}

    fn fetch(client: &ApiClient, _: &()) -> Result<RunningTimeData> {
        match (client.fetch_hourly_production(), client.fetch_plan_actual()) {
            (Err(e), Err(_)) => Err(e),
            (hourly, plan_actual) => Ok(RunningTimeData {
                hourly: keep_ok("running-time", "hourly production", hourly),
                plan_actual: keep_ok("running-time", "plan vs actual", plan_actual),
            }),
        }
    }

    fn apply(&mut self, seq: u64, data: RunningTimeData) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        if let Some(hourly) = data.hourly {
            self.buckets = hourly.hourly_buckets(self.target);
            self.hourly = Some(hourly);
        }
        if let Some(rows) = data.plan_actual {
            self.plan_actual = rows;
        }
        true
    }

    fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    fn freshness_mut(&mut self) -> &mut Freshness {
        &mut self.freshness
    }

    fn entry_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.count > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(json: &str) -> HourlyProduction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn partial_update_keeps_the_other_side() {
        let mut view = RunningTimeView::new(100.0);
        let rows: Vec<PlanActualRow> =
            serde_json::from_str(r#"[{"date": "2025-01-05", "shift": "shift-1", "plan": 10, "actual": 9}]"#)
                .unwrap();
        assert!(view.apply(
            1,
            RunningTimeData {
                hourly: Some(hourly(r#"{"hourlyProduction": {"P": {"08:00": 120}}}"#)),
                plan_actual: Some(rows),
            },
        ));
        assert!(view.apply(
            2,
            RunningTimeData {
                hourly: Some(hourly(r#"{"hourlyProduction": {"P": {"09:00": 50}}}"#)),
                plan_actual: None,
            },
        ));

        assert_eq!(view.buckets()[9].count, 50.0);
        assert_eq!(view.buckets()[8].count, 0.0);
        assert_eq!(view.plan_actual().len(), 1);
        assert_eq!(view.produced_today(), 50.0);
        assert_eq!(view.entry_count(), 1);
    }

    #[test]
    fn target_colours_the_bars() {
        let mut view = RunningTimeView::new(106.0);
        view.apply(
            1,
            RunningTimeData {
                hourly: Some(hourly(r#"{"hourlyProduction": {"P": {"08:00": 106, "09:00": 105}}}"#)),
                plan_actual: None,
            },
        );
        assert!(view.buckets()[8].meets_target);
        assert!(!view.buckets()[9].meets_target);
    }
}
