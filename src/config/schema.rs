/// Configuration schema and defaults for oeeview.
///
/// Defines the TOML-serializable configuration structure with sections
/// `[api]`, `[poll]`, `[production]`, `[web]`, `[logging]` and `[parts]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level oeeview configuration.
///
/// Maps directly to `~/.oeeview/config.toml` and `.oeeview.toml`. All
/// sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OeeviewConfig {
    pub api: ApiConfig,
    pub poll: PollConfig,
    pub production: ProductionConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
    pub parts: PartsConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// OEE backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL (without a trailing `/api`).
    pub base_url: String,
    /// Timeout for data requests (milliseconds).
    pub timeout_ms: u64,
    /// Timeout for the health check (milliseconds).
    pub health_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oee-backend-1.onrender.com".to_string(),
            timeout_ms: 15_000,
            health_timeout_ms: 6_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [poll]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between refreshes of each view.
    pub interval_secs: u64,
    /// Seconds between backend health checks in the dashboard.
    pub health_interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 20,
            health_interval_secs: 15,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// [production]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    /// Units per hour a running-time bar must reach to count as on target.
    pub hourly_target: f64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self { hourly_target: 106.0 }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `oeeview web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9760".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append every poll outcome to `~/.oeeview/poll-log.jsonl`.
    pub poll_log: bool,
    /// Diagnostic log filter used when `OEEVIEW_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            poll_log: true,
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [parts]
// ---------------------------------------------------------------------------

/// A part known to the line, used to label quality views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartsConfig {
    /// Selection used when `--part` is omitted: a part name or `all`.
    pub default_selection: String,
    pub known: Vec<PartInfo>,
}

impl Default for PartsConfig {
    fn default() -> Self {
        Self {
            default_selection: "all".to_string(),
            known: vec![
                PartInfo {
                    number: "9253020232".to_string(),
                    name: "BIG CYLINDER".to_string(),
                },
                PartInfo {
                    number: "9253010242".to_string(),
                    name: "SMALL CYLINDER".to_string(),
                },
            ],
        }
    }
}

impl PartsConfig {
    /// The part whose shift plan the dashboard shows: the default
    /// selection when it names a known part, otherwise the first known part.
    pub fn plan_part(&self) -> Option<&PartInfo> {
        self.known
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(self.default_selection.trim()))
            .or_else(|| self.known.first())
    }

    /// Part number for a part name, if the part is known.
    pub fn number_for(&self, name: &str) -> Option<&str> {
        self.known
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.number.as_str())
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl OeeviewConfig {
    /// Annotated default config file content, written by `oeeview config init`.
    pub fn default_toml() -> String {
        r#"# oeeview Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (OEEVIEW_*)
#   2. Project config (.oeeview.toml in current directory)
#   3. User global config (~/.oeeview/config.toml)
#   4. Built-in defaults

[api]
base_url = "https://oee-backend-1.onrender.com"
timeout_ms = 15000
health_timeout_ms = 6000

[poll]
interval_secs = 20                    # Refresh period of every view
health_interval_secs = 15             # Dashboard backend health check

[production]
hourly_target = 106.0                 # Units per hour for an on-target bar

[web]
addr = "127.0.0.1:9760"
open_browser = true

[logging]
poll_log = true                       # ~/.oeeview/poll-log.jsonl
level = "warn"                        # Overridden by OEEVIEW_LOG

[parts]
default_selection = "all"             # Part name, or "all" to merge every part

[[parts.known]]
number = "9253020232"
name = "BIG CYLINDER"

[[parts.known]]
number = "9253010242"
name = "SMALL CYLINDER"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
