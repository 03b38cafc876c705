use serde::Serialize;

use super::{MeasurementRecord, PartitionedInput, RankedEntry, merge_by_category, rank_by_contribution};

/// What a Pareto view is built from.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    /// One partition's records, ranked as-is.
    Single(&'a [MeasurementRecord]),
    /// Every partition, merged by category before ranking.
    All(&'a PartitionedInput),
}

/// Build the ranked sequence for a selection.
///
/// Both branches end in [`rank_by_contribution`], so the chart and table of
/// a single part and of the merged view are computed identically.
pub fn build_pareto_view(selection: Selection<'_>) -> Vec<RankedEntry> {
    match selection {
        Selection::Single(records) => rank_by_contribution(records),
        Selection::All(partitioned) => {
            let merged = merge_by_category(partitioned);
            rank_by_contribution(&merged)
        }
    }
}

/// A ranked sequence together with its grand total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParetoTable {
    pub total_amount: f64,
    pub entries: Vec<RankedEntry>,
}

impl ParetoTable {
    pub fn from_selection(selection: Selection<'_>) -> Self {
        Self::from_entries(build_pareto_view(selection))
    }

    pub fn from_entries(entries: Vec<RankedEntry>) -> Self {
        let total_amount = entries.last().map(|e| e.running_total).unwrap_or(0.0);
        Self {
            total_amount,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leading entries up to and including the first whose cumulative
    /// percent reaches `threshold`.
    ///
    /// Empty when the total is zero, since no category contributes anything.
    pub fn vital_few(&self, threshold: f64) -> &[RankedEntry] {
        if self.total_amount <= 0.0 {
            return &[];
        }

        match self
            .entries
            .iter()
            .position(|e| e.cumulative_percent >= threshold)
        {
            Some(i) => &self.entries[..=i],
            None => &self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(category: &str, amount: f64) -> MeasurementRecord {
        MeasurementRecord::new(category, amount)
    }

    #[test]
    fn single_and_merged_paths_agree_for_one_partition() {
        let records = vec![rec("X", 4.0), rec("Y", 1.0), rec("Z", 7.0)];
        let mut partitioned = PartitionedInput::new();
        partitioned.insert("only".into(), records.clone());

        let single = build_pareto_view(Selection::Single(&records));
        let merged = build_pareto_view(Selection::All(&partitioned));
        assert_eq!(single, merged);
    }

    #[test]
    fn table_total_matches_last_running_total() {
        let table = ParetoTable::from_selection(Selection::Single(&[
            rec("a", 50.0),
            rec("b", 30.0),
            rec("c", 20.0),
        ]));
        assert_eq!(table.total_amount, 100.0);
        assert_eq!(table.entries.len(), 3);
    }

    #[test]
    fn vital_few_stops_at_threshold() {
        let table = ParetoTable::from_selection(Selection::Single(&[
            rec("a", 50.0),
            rec("b", 30.0),
            rec("c", 20.0),
        ]));
        let vital: Vec<&str> = table
            .vital_few(80.0)
            .iter()
            .map(|e| e.category.as_str())
            .collect();
        assert_eq!(vital, ["a", "b"]);
    }

    #[test]
    fn vital_few_empty_for_zero_total() {
        let table = ParetoTable::from_selection(Selection::Single(&[rec("a", 0.0)]));
        assert!(table.vital_few(80.0).is_empty());
        assert!(ParetoTable::default().vital_few(80.0).is_empty());
    }
}
