use anyhow::Result;

use super::{Freshness, PolledView};
use crate::client::ApiClient;
use crate::pareto::ParetoTable;
use crate::payload::{MonthlyStats, PartSelection};
use crate::summary::{self, QualitySummary};

/// Rejection analysis for the selected part, or for every part merged.
#[derive(Debug, Clone, Default)]
pub struct RejectionView {
    data: Option<MonthlyStats>,
    selection: PartSelection,
    pareto: ParetoTable,
    quality: QualitySummary,
    freshness: Freshness,
}

impl RejectionView {
    pub fn new(selection: PartSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &PartSelection {
        &self.selection
    }

    /// Switch parts, re-deriving from the held payload without refetching.
    pub fn select(&mut self, selection: PartSelection) {
        if self.selection != selection {
            self.selection = selection;
            self.derive();
        }
    }

    pub fn pareto(&self) -> &ParetoTable {
        &self.pareto
    }

    pub fn quality(&self) -> QualitySummary {
        self.quality
    }

    /// Part names present in the latest payload.
    pub fn part_names(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|d| d.part_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Ranked table and summary for an arbitrary selection, computed from
    /// the held payload without changing the view's own selection.
    pub fn pareto_for(&self, selection: &PartSelection) -> (ParetoTable, QualitySummary) {
        match &self.data {
            Some(data) => (
                data.rejection_pareto(selection),
                summary::quality(data, selection),
            ),
            None => (ParetoTable::default(), QualitySummary::default()),
        }
    }

    fn derive(&mut self) {
        let (pareto, quality) = self.pareto_for(&self.selection);
        self.pareto = pareto;
        self.quality = quality;
    }
}

impl PolledView for RejectionView {
    type Data = MonthlyStats;
    type Query = ();

    fn name(&self) -> &'static str {
        "rejections"
    }

    fn query(&self) {}

    fn fetch(client: &ApiClient, _: &()) -> Result<MonthlyStats> {
        client.fetch_monthly_stats()
    }

    fn apply(&mut self, seq: u64, data: MonthlyStats) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        self.data = Some(data);
        self.derive();
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

    fn stats() -> MonthlyStats {
        serde_json::from_str(
            r#"{"stats": {
                "P1": {"goodCount": 10, "totalRejections": 5, "rejectionsByReason": [
                    {"reason": "X", "count": 4}, {"reason": "Y", "count": 1}]},
                "P2": {"goodCount": 20, "totalRejections": 9, "rejectionsByReason": [
                    {"reason": "X", "count": 6}, {"reason": "Z", "count": 3}]}
            }}"#,
        )
        .unwrap()
    }

    #[test]
    fn merged_selection_by_default() {
        let mut view = RejectionView::new(PartSelection::AllParts);
        assert!(view.apply(1, stats()));

        let percents: Vec<f64> = view
            .pareto()
            .entries
            .iter()
            .map(|e| e.cumulative_percent)
            .collect();
        assert_eq!(percents, [71.4, 92.9, 100.0]);
        assert_eq!(view.quality().good, 30.0);
        assert_eq!(view.part_names(), ["P1", "P2"]);
    }

    #[test]
    fn select_rederives_without_refetch() {
        let mut view = RejectionView::new(PartSelection::AllParts);
        view.apply(1, stats());
        view.select(PartSelection::Part("P2".into()));

        assert_eq!(view.selection(), &PartSelection::Part("P2".into()));
        assert_eq!(view.pareto().total_amount, 9.0);
        assert_eq!(view.quality().rejected, 9.0);
        assert_eq!(view.freshness().applied_seq, 1);
    }

    #[test]
    fn empty_before_first_poll() {
        let view = RejectionView::new(PartSelection::Part("P1".into()));
        assert!(view.pareto().is_empty());
        let (table, quality) = view.pareto_for(&PartSelection::AllParts);
        assert!(table.is_empty());
        assert_eq!(quality, QualitySummary::default());
    }
}
