use anyhow::Result;
use chrono::{DateTime, Utc};

use super::{Freshness, PolledView};
use crate::client::ApiClient;

/// Cached backend reachability, refreshed on its own slower schedule so
/// reading it never waits on the backend.
#[derive(Debug, Clone, Default)]
pub struct HealthView {
    online: Option<bool>,
    freshness: Freshness,
}

impl HealthView {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first check completes.
    pub fn online(&self) -> Option<bool> {
        self.online
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.freshness.updated_at
    }
}

impl PolledView for HealthView {
    type Data = bool;
    type Query = ();

    fn name(&self) -> &'static str {
        "health"
    }

    fn query(&self) {}

    fn fetch(client: &ApiClient, _: &()) -> Result<bool> {
        Ok(client.is_healthy())
    }

    fn apply(&mut self, seq: u64, online: bool) -> bool {
        if !self.freshness.accept(seq) {
            return false;
        }
        self.online = Some(online);
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
