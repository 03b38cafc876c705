/// Configuration system for oeeview.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::OeeviewConfig::default()`]
/// 2. **User global config**: `~/.oeeview/config.toml`
/// 3. **Project local config**: `.oeeview.toml` in the current working directory
/// 4. **Environment variables**: `OEEVIEW_*` overrides (highest precedence)
///
/// File layers are merged key by key: a file that only sets
/// `poll.interval_secs` leaves every other value from the layer below intact.
///
/// # Usage
///
/// ```rust,ignore
/// use oeeview::config;
///
/// let cfg = config::load();
/// let interval = std::time::Duration::from_secs(cfg.poll.interval_secs);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

pub use schema::OeeviewConfig;
use schema::ProductionConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved oeeview configuration.
///
/// Merges defaults → global TOML → project TOML → env vars. Malformed files
/// are skipped with a warning so a bad edit never stops the dashboard.
pub fn load() -> OeeviewConfig {
    let mut layers = Vec::new();
    if let Some(global) = global_config_path() {
        layers.push(global);
    }
    if let Some(project) = project_config_path() {
        layers.push(project);
    }

    let mut config = load_layers(&layers);
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    enforce_limits(&mut config);
    config
}

/// Merge the given TOML files, in order, over the built-in defaults.
pub fn load_layers(paths: &[PathBuf]) -> OeeviewConfig {
    let Ok(mut merged) = toml::Value::try_from(OeeviewConfig::default()) else {
        return OeeviewConfig::default();
    };

    for path in paths {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config = merged.try_into().unwrap_or_else(|e| {
        warn!(error = %e, "merged config does not match schema, using defaults");
        OeeviewConfig::default()
    });
    enforce_limits(&mut config);
    config
}

fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Recursively overlay `overlay` onto `base`. Tables merge; every other
/// value (including arrays) is replaced.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.oeeview/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".oeeview").join("config.toml"))
}

/// Path to the project local config: `.oeeview.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".oeeview.toml"))
}

pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `OEEVIEW_API_URL`: backend base URL
/// - `OEEVIEW_API_TIMEOUT_MS`: data request timeout
/// - `OEEVIEW_POLL_INTERVAL_SECS`: refresh period
/// - `OEEVIEW_WEB_ADDR`: dashboard listen address
/// - `OEEVIEW_POLL_LOG`: poll log on/off (`1`/`true`/`yes`/`on`)
/// - `OEEVIEW_PART`: default part selection
pub fn apply_env_overrides<F>(config: &mut OeeviewConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("OEEVIEW_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Some(val) = lookup("OEEVIEW_API_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Some(val) = lookup("OEEVIEW_POLL_INTERVAL_SECS")
        && let Ok(secs) = val.parse::<u64>()
        && secs > 0
    {
        config.poll.interval_secs = secs;
    }
    if let Some(val) = lookup("OEEVIEW_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Some(val) = lookup("OEEVIEW_POLL_LOG")
        && let Some(flag) = parse_flag(&val)
    {
        config.logging.poll_log = flag;
    }
    if let Some(val) = lookup("OEEVIEW_PART")
        && !val.is_empty()
    {
        config.parts.default_selection = val;
    }
}

/// Parse an on/off flag. Anything unrecognized is `None`.
fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Integer keys with a lower bound. A poll interval of zero would hammer the
/// backend, and a zero timeout fails every request.
const INTEGER_FLOORS: &[(&str, i64)] = &[
    ("poll.interval_secs", 1),
    ("poll.health_interval_secs", 1),
    ("api.timeout_ms", 1),
    ("api.health_timeout_ms", 1),
];

fn floor_for(key: &str) -> Option<i64> {
    INTEGER_FLOORS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, floor)| floor)
}

/// Raise out-of-range values to their floor. Applied to every resolved
/// config, so file layers cannot bypass the limits `config set` enforces.
fn enforce_limits(config: &mut OeeviewConfig) {
    for (key, slot) in [
        ("poll.interval_secs", &mut config.poll.interval_secs),
        ("poll.health_interval_secs", &mut config.poll.health_interval_secs),
        ("api.timeout_ms", &mut config.api.timeout_ms),
        ("api.health_timeout_ms", &mut config.api.health_timeout_ms),
    ] {
        let floor = floor_for(key).map_or(0, |f| f as u64);
        if *slot < floor {
            warn!(key, value = *slot, floor, "config value below minimum, raised");
            *slot = floor;
        }
    }
    let target = &mut config.production.hourly_target;
    if !target.is_finite() || *target < 0.0 {
        warn!(value = *target, "production.hourly_target must be a non-negative number, reset");
        *target = ProductionConfig::default().hourly_target;
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the annotated default config to `~/.oeeview/config.toml`.
///
/// An existing file is kept unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to replace it)",
            path.display()
        );
    }
    write_config_file(&path, &OeeviewConfig::default_toml())?;
    Ok(path)
}

/// Overwrite `~/.oeeview/config.toml` with the defaults.
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

fn write_config_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Set one dotted key (e.g. `poll.interval_secs`) in the global config file.
/// A missing file starts from the defaults.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut doc: toml::Value = if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("{} is not valid TOML", path.display()))?
    } else {
        toml::Value::try_from(OeeviewConfig::default()).context("failed to build default config")?
    };

    set_toml_value(&mut doc, key, value)?;

    let text = toml::to_string_pretty(&doc).context("failed to serialize config")?;
    write_config_file(path, &text)
}

/// Replace the value at a dotted `key`, parsed to the type of the value
/// already there. Unknown keys and list values are refused.
fn set_toml_value(root: &mut toml::Value, key: &str, raw: &str) -> Result<()> {
    let (section_path, leaf) = match key.rsplit_once('.') {
        Some((section, leaf)) => (Some(section), leaf),
        None => (None, key),
    };
    if leaf.is_empty() || section_path.is_some_and(|s| s.split('.').any(str::is_empty)) {
        anyhow::bail!("invalid config key: '{key}'");
    }

    let section = section_path
        .into_iter()
        .flat_map(|s| s.split('.'))
        .try_fold(root, |node, name| node.get_mut(name))
        .and_then(toml::Value::as_table_mut)
        .with_context(|| format!("unknown config section in '{key}'"))?;

    let current = section
        .get(leaf)
        .with_context(|| format!("unknown config key: '{key}'"))?;
    let value = coerce_like(current, key, raw)?;

    if let (toml::Value::Integer(n), Some(floor)) = (&value, floor_for(key))
        && *n < floor
    {
        anyhow::bail!("'{key}' must be at least {floor}, got {n}");
    }

    section.insert(leaf.to_string(), value);
    Ok(())
}

fn coerce_like(current: &toml::Value, key: &str, raw: &str) -> Result<toml::Value> {
    Ok(match current {
        toml::Value::Boolean(_) => toml::Value::Boolean(
            parse_flag(raw).with_context(|| format!("'{key}' takes on/off, got '{raw}'"))?,
        ),
        toml::Value::Integer(_) => toml::Value::Integer(
            raw.trim()
                .parse()
                .with_context(|| format!("'{key}' takes a whole number, got '{raw}'"))?,
        ),
        toml::Value::Float(_) => toml::Value::Float(
            raw.trim()
                .parse()
                .with_context(|| format!("'{key}' takes a number, got '{raw}'"))?,
        ),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            anyhow::bail!("'{key}' is not a single value; edit the config file directly")
        }
        _ => toml::Value::String(raw.to_string()),
    })
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
