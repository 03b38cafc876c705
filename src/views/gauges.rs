use anyhow::Result;

use super::{Freshness, PolledView};
use crate::client::ApiClient;
use crate::payload::OeeData;
use crate::summary::{self, OeeGauges};

/// Headline OEE percentages.
#[derive(Debug, Clone, Default)]
pub struct GaugeView {
    gauges: OeeGauges,
    freshness: Freshness,
}

impl GaugeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gauges(&self) -> OeeGauges {
        self.gauges
    }
}

impl PolledView for GaugeView {
    type Data = OeeData;
    type Query = ();

    fn name(&self) -> &'static str {
        "oee"
    }

    fn query(&self) {}

    fn fetch(client: &ApiClient, _: &()) -> Result<OeeData> {
        client.fetch_oee()
    }

    fn apply(&mut self, seq: u64, data: OeeData) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        self.gauges = summary::gauges(&data);
        true
    }

    fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    fn freshness_mut(&mut self) -> &mut Freshness {
        &mut self.freshness
    }

    fn entry_count(&self) -> usize {
        0
    }
}
