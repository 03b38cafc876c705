/// OEE backend HTTP client.
///
/// Talks to the backend with the synchronous `ureq` client. Provides:
///
/// - **Data fetches**: monthly runtime (stoppages), monthly stats
///   (rejections per part), headline OEE ratios, hourly production,
///   plan against actual, production share and OEE history.
/// - **Shift plan**: the running shift's plan and actual for one part.
/// - **Health check**: a short-timeout request to the production endpoint.
///
/// The client does no retry or backoff; the poller simply tries again on
/// its next tick.
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::schema::ApiConfig;
use crate::payload::{
    self, HourlyProduction, MonthlyStats, OeeData, OeeHistoryRecord, PlanActualRow,
    ProductionShares, RuntimeData, ShiftPlan,
};

pub const RUNTIME_PATH: &str = "/api/monthly-runtime";
pub const MONTHLY_STATS_PATH: &str = "/api/monthly-stats";
pub const OEE_PATH: &str = "/api/oee";
pub const HOURLY_PRODUCTION_PATH: &str = "/api/hourly-production-data";
pub const PLAN_ACTUAL_PATH: &str = "/api/recent-plan-actual";
pub const SHARES_PATH: &str = "/api/pie";
pub const OEE_HISTORY_PATH: &str = "/api/oee-history";
pub const PRODUCTION_PATH: &str = "/api/production";
pub const HEALTH_PATH: &str = PRODUCTION_PATH;

/// Synchronous OEE backend client.
///
/// Cheap to clone; each view's poller holds its own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    health_timeout: Duration,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: normalize_base_url(&config.base_url),
            timeout: Duration::from_millis(config.timeout_ms),
            health_timeout: Duration::from_millis(config.health_timeout_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_runtime(&self) -> Result<RuntimeData> {
        self.get_data(RUNTIME_PATH)
    }

    pub fn fetch_monthly_stats(&self) -> Result<MonthlyStats> {
        self.get_data(MONTHLY_STATS_PATH)
    }

    pub fn fetch_oee(&self) -> Result<OeeData> {
        self.get_data(OEE_PATH)
    }

    pub fn fetch_hourly_production(&self) -> Result<HourlyProduction> {
        let body = self.get_body(HOURLY_PRODUCTION_PATH)?;
        payload::parse_flat_envelope(&body)
            .with_context(|| format!("bad response from {}", self.url(HOURLY_PRODUCTION_PATH)))
    }

    pub fn fetch_plan_actual(&self) -> Result<Vec<PlanActualRow>> {
        self.get_data(PLAN_ACTUAL_PATH)
    }

    pub fn fetch_production_shares(&self) -> Result<ProductionShares> {
        self.get_bare(SHARES_PATH)
    }

    pub fn fetch_oee_history(&self) -> Result<Vec<OeeHistoryRecord>> {
        self.get_bare(OEE_HISTORY_PATH)
    }

    /// Plan and actual for the running shift of one part.
    ///
    /// The backend answers an error status or `success: false` when no
    /// shift is planned for the part; that is a [`ShiftPlan::nil`], not an
    /// error. Transport failures are errors.
    pub fn fetch_shift_plan(&self, part_number: &str) -> Result<ShiftPlan> {
        let url = self.url(PRODUCTION_PATH);
        debug!(url = %url, part_number, "posting");

        let response = match ureq::post(&url)
            .timeout(self.timeout)
            .send_json(serde_json::json!({ "partNumber": part_number }))
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, _)) => {
                debug!(url = %url, code, "no shift plan");
                return Ok(ShiftPlan::nil());
            }
            Err(e) => return Err(e).with_context(|| format!("request to {url} failed")),
        };
        let body = response
            .into_string()
            .with_context(|| format!("failed to read response body from {url}"))?;

        Ok(payload::parse_flat_envelope(&body).unwrap_or_else(|e| {
            debug!(url = %url, error = %e, "no shift plan");
            ShiftPlan::nil()
        }))
    }

    /// Whether the backend answers the production endpoint with a 2xx.
    pub fn is_healthy(&self) -> bool {
        let url = self.url(HEALTH_PATH);
        match ureq::get(&url).timeout(self.health_timeout).call() {
            Ok(resp) => (200..300).contains(&resp.status()),
            Err(e) => {
                debug!(url = %url, error = %e, "health check failed");
                false
            }
        }
    }

    /// GET an enveloped `{ success, data }` response.
    fn get_data<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let body = self.get_body(path)?;
        payload::parse_envelope(&body).with_context(|| format!("bad response from {}", self.url(path)))
    }

    /// GET a response that is the payload itself.
    fn get_bare<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let body = self.get_body(path)?;
        serde_json::from_str(&body).with_context(|| format!("bad response from {}", self.url(path)))
    }

    fn get_body(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!(url = %url, "fetching");

        ureq::get(&url)
            .timeout(self.timeout)
            .call()
            .with_context(|| format!("request to {url} failed"))?
            .into_string()
            .with_context(|| format!("failed to read response body from {url}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Trim trailing slashes and avoid slow IPv6 `localhost` resolution.
fn normalize_base_url(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('/')
        .replace("://localhost", "://127.0.0.1")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = ApiClient::from_config(&ApiConfig::default());
        assert_eq!(client.base_url(), "https://oee-backend-1.onrender.com");
        assert_eq!(client.timeout, Duration::from_millis(15_000));
        assert_eq!(client.health_timeout, Duration::from_millis(6_000));
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(normalize_base_url("http://localhost:5000//"), "http://127.0.0.1:5000");
        assert_eq!(normalize_base_url(" https://example.com/ "), "https://example.com");
    }

    #[test]
    fn urls_join_paths() {
        let mut config = ApiConfig::default();
        config.base_url = "http://10.0.0.2:8000/".to_string();
        let client = ApiClient::from_config(&config);
        assert_eq!(client.url(OEE_PATH), "http://10.0.0.2:8000/api/oee");
    }

    #[test]
    fn unreachable_backend_is_unhealthy() {
        let mut config = ApiConfig::default();
        config.base_url = "http://127.0.0.1:9".to_string();
        config.health_timeout_ms = 500;
        let client = ApiClient::from_config(&config);
        assert!(!client.is_healthy());
        assert!(client.fetch_runtime().is_err());
        assert!(client.fetch_oee_history().is_err());
        // a dead backend is an error, not a plan with no figures
        assert!(client.fetch_shift_plan("9253020232").is_err());
    }
}
