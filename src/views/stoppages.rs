use anyhow::Result;

use super::{Freshness, PolledView};
use crate::client::ApiClient;
use crate::pareto::ParetoTable;
use crate::payload::RuntimeData;
use crate::summary::{self, AvailabilitySummary};

/// Stoppage analysis: ranked stoppage minutes by reason plus run/stop hours.
#[derive(Debug, Clone, Default)]
pub struct StoppageView {
    data: Option<RuntimeData>,
    pareto: ParetoTable,
    availability: AvailabilitySummary,
    freshness: Freshness,
}

impl StoppageView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pareto(&self) -> &ParetoTable {
        &self.pareto
    }

    pub fn availability(&self) -> AvailabilitySummary {
        self.availability
    }

    pub fn data(&self) -> Option<&RuntimeData> {
        self.data.as_ref()
    }
}

impl PolledView for StoppageView {
    type Data = RuntimeData;
    type Query = ();

    fn name(&self) -> &'static str {
        "stoppages"
    }

    fn query(&self) {}

    fn fetch(client: &ApiClient, _: &()) -> Result<RuntimeData> {
        client.fetch_runtime()
    }

    fn apply(&mut self, seq: u64, data: RuntimeData) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        self.pareto = data.stoppage_pareto();
        self.availability = summary::availability(&data);
        self.data = Some(data);
        true
    }

    fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    fn freshness_mut(&mut self) -> &mut Freshness {
        &mut self.freshness
    }

    fn entry_count(&self) -> usize {
        self.pareto.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(json: &str) -> RuntimeData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn apply_derives_pareto_and_availability() {
        let mut view = StoppageView::new();
        let applied = view.apply(
            1,
            runtime(
                r#"{"stats": {"stoppagesByReason": [
                    {"reason": "a", "duration": 30},
                    {"reason": "b", "duration": 90}
                ], "actualRunTime": 120, "totalStopTime": 120}}"#,
            ),
        );

        assert!(applied);
        assert_eq!(view.pareto().entries[0].category, "b");
        assert_eq!(view.pareto().entries[0].cumulative_percent, 75.0);
        assert_eq!(view.availability().run_hours, 2.0);
        assert_eq!(view.entry_count(), 2);
    }

    #[test]
    fn stale_payload_does_not_overwrite() {
        let mut view = StoppageView::new();
        let newer = runtime(r#"{"stats": {"stoppagesByReason": [{"reason": "new", "duration": 5}]}}"#);
        let older = runtime(r#"{"stats": {"stoppagesByReason": [{"reason": "old", "duration": 5}]}}"#);

        assert!(view.apply(2, newer));
        assert!(!view.apply(1, older));
        assert_eq!(view.pareto().entries[0].category, "new");
    }
}
