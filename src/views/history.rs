use anyhow::Result;

use super::{Freshness, PolledView};
use crate::client::ApiClient;
use crate::payload::history::{self, OeeDay, OeeHistoryRecord};

/// OEE per shift, one row per day.
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    days: Vec<OeeDay>,
    freshness: Freshness,
}

impl HistoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days(&self) -> &[OeeDay] {
        &self.days
    }
}

impl PolledView for HistoryView {
    type Data = Vec<OeeHistoryRecord>;
    type Query = ();

    fn name(&self) -> &'static str {
        "oee-history"
    }

    fn query(&self) {}

    fn fetch(client: &ApiClient, _: &()) -> Result<Vec<OeeHistoryRecord>> {
        client.fetch_oee_history()
    }

    fn apply(&mut self, seq: u64, data: Vec<OeeHistoryRecord>) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        self.days = history::group_by_date(&data);
        true
    }

    fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    fn freshness_mut(&mut self) -> &mut Freshness {
        &mut self.freshness
    }

    fn entry_count(&self) -> usize {
        self.days.len()
    }
}
