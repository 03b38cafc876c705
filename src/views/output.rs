use anyhow::Result;

use super::{Freshness, PolledView, keep_ok};
use crate::client::ApiClient;
use crate::config::schema::PartInfo;
use crate::payload::{PartShare, ProductionShares, ShiftPlan};

/// Each part's share of output and the running shift's plan against actual
/// for one part.
#[derive(Debug, Clone, Default)]
pub struct OutputView {
    part: Option<PartInfo>,
    shares: Vec<PartShare>,
    shift_plan: ShiftPlan,
    freshness: Freshness,
}

#[derive(Debug, Default)]
pub struct OutputData {
    pub shares: Option<ProductionShares>,
    pub shift_plan: Option<ShiftPlan>,
}

impl OutputView {
    /// `part` is the part whose shift plan is requested; without one the
    /// plan stays NIL.
    pub fn new(part: Option<PartInfo>) -> Self {
        Self {
            part,
            ..Self::default()
        }
    }

    pub fn part(&self) -> Option<&PartInfo> {
        self.part.as_ref()
    }

    pub fn shares(&self) -> &[PartShare] {
        &self.shares
    }

    pub fn shift_plan(&self) -> ShiftPlan {
        self.shift_plan
    }
}

impl PolledView for OutputView {
    type Data = OutputData;
    /// Part number to request the shift plan for.
    type Query = Option<String>;

    fn name(&self) -> &'static str {
        "output"
    }

    fn query(&self) -> Option<String> {
        self.part.as_ref().map(|p| p.number.clone())
    }

    fn fetch(client: &ApiClient, part_number: &Option<String>) -> Result<OutputData> {
        let shares = client.fetch_production_shares();
        let Some(number) = part_number else {
            return shares.map(|s| OutputData {
                shares: Some(s),
                shift_plan: None,
            });
        };
        match (shares, client.fetch_shift_plan(number)) {
            (Err(e), Err(_)) => Err(e),
            (shares, plan) => Ok(OutputData {
                shares: keep_ok("output", "production share", shares),
                shift_plan: keep_ok("output", "shift plan", plan),
            }),
        }
    }

    fn apply(&mut self, seq: u64, data: OutputData) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        if let Some(shares) = data.shares {
            self.shares = shares.shares();
        }
        if let Some(plan) = data.shift_plan {
            self.shift_plan = plan;
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
        self.shares.len()
    }
}
