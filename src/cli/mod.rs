//! CLI command implementations for oeeview.
//!
//! Provides subcommand handlers for:
//! - `oeeview stoppages`: ranked stoppage analysis
//! - `oeeview rejections --part NAME|all`: ranked rejection analysis
//! - `oeeview hourly`: units produced per hour against the hourly target
//! - `oeeview history`: OEE per shift for each recorded day
//! - `oeeview summary`: availability, quality, OEE, output share and the
//!   running shift's plan against actual
//! - `oeeview watch`: terminal view refreshed on every poll
//! - `oeeview health`: backend reachability, config sources, poll log
//! - `oeeview config show|init|set|reset`: configuration management

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::poll_log;
use crate::client::ApiClient;
use crate::config::schema::PartInfo;
use crate::config::{self, OeeviewConfig};
use crate::pareto::{ParetoTable, VITAL_FEW_THRESHOLD};
use crate::payload::history::{self, SHIFTS};
use crate::payload::{
    self, HourlyProduction, MonthlyStats, OeeHistoryRecord, PartSelection, PlanActualRow,
    RuntimeData,
};
use crate::summary::{self, QualitySummary};
use crate::views::{self, PolledView, RejectionView, StoppageView};

/// Output format for analysis commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Column headings for one kind of Pareto table.
#[derive(Debug, Clone, Copy)]
struct Headings {
    title: &'static str,
    category: &'static str,
    amount: &'static str,
}

const STOPPAGE_HEADINGS: Headings = Headings {
    title: "Stoppage Analysis",
    category: "Stoppage reason",
    amount: "Duration (min)",
};

const REJECTION_HEADINGS: Headings = Headings {
    title: "Rejection Analysis",
    category: "Rejection reason",
    amount: "Count",
};

// ---------------------------------------------------------------------------
// oeeview stoppages
// ---------------------------------------------------------------------------

/// Show the ranked stoppage analysis, from the backend or a saved payload.
pub fn run_stoppages(format: OutputFormat, file: Option<&Path>) -> Result<()> {
    let data: RuntimeData = match file {
        Some(path) => read_payload_file(path)?,
        None => ApiClient::from_config(&config::load().api).fetch_runtime()?,
    };

    let table = data.stoppage_pareto();
    if table.is_empty() {
        println!("{}", "No stoppages recorded.".yellow());
        return Ok(());
    }

    let availability = summary::availability(&data);
    print_pareto(&table, STOPPAGE_HEADINGS, None, format)?;
    if format == OutputFormat::Table {
        println!();
        println!(
            "  {} {:.2} h   {} {:.2} h",
            "Run time:".bold(),
            availability.run_hours,
            "Stop time:".bold(),
            availability.stop_hours,
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// oeeview rejections
// ---------------------------------------------------------------------------

/// Show the ranked rejection analysis for one part or all parts merged.
pub fn run_rejections(part: Option<&str>, format: OutputFormat, file: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let selection = selection_or_default(part, &cfg);

    let data: MonthlyStats = match file {
        Some(path) => read_payload_file(path)?,
        None => ApiClient::from_config(&cfg.api).fetch_monthly_stats()?,
    };

    let table = data.rejection_pareto(&selection);
    if table.is_empty() {
        let known: Vec<&str> = data.part_names().collect();
        println!(
            "{}",
            format!("No rejections for {selection}.").yellow()
        );
        if let PartSelection::Part(_) = selection
            && !known.is_empty()
        {
            println!("  {} {}", "Parts in payload:".dimmed(), known.join(", "));
        }
        return Ok(());
    }

    let quality = summary::quality(&data, &selection);
    print_pareto(&table, REJECTION_HEADINGS, Some(&selection), format)?;
    if format == OutputFormat::Table {
        println!();
        print_quality_line(&quality);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// oeeview summary
// ---------------------------------------------------------------------------

/// Show availability, quality and OEE headline figures.
pub fn run_summary(part: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let selection = selection_or_default(part, &cfg);
    let client = ApiClient::from_config(&cfg.api);

    println!("{}", "OEE Summary".bold().cyan());
    println!("{}", "=".repeat(50));

    match client.fetch_oee() {
        Ok(oee) => {
            let g = summary::gauges(&oee);
            println!(
                "  {} {:>6.1}%   {} {:>6.1}%",
                "OEE:         ".bold(),
                g.oee,
                "Availability:".bold(),
                g.availability
            );
            println!(
                "  {} {:>6.1}%   {} {:>6.1}%",
                "Performance: ".bold(),
                g.performance,
                "Quality:     ".bold(),
                g.quality
            );
        }
        Err(e) => println!("  {} {e:#}", "OEE unavailable:".red()),
    }
    println!();

    match client.fetch_runtime() {
        Ok(runtime) => {
            let a = summary::availability(&runtime);
            println!(
                "  {} {:.2} h   {} {:.2} h",
                "Run time:".bold(),
                a.run_hours,
                "Stop time:".bold(),
                a.stop_hours
            );
        }
        Err(e) => println!("  {} {e:#}", "Runtime unavailable:".red()),
    }

    match client.fetch_monthly_stats() {
        Ok(stats) => {
            println!("  {} {}", "Part:".bold(), part_label(&selection, &cfg));
            print_quality_line(&summary::quality(&stats, &selection));
        }
        Err(e) => println!("  {} {e:#}", "Quality unavailable:".red()),
    }
    println!();

    match client.fetch_production_shares() {
        Ok(shares) => {
            for share in shares.shares() {
                println!(
                    "  {:<24} {:>8} {:>6.1}%",
                    truncate(&share.part, 24),
                    format_amount(share.count),
                    share.percent
                );
            }
        }
        Err(e) => println!("  {} {e:#}", "Output share unavailable:".red()),
    }

    if let Some(part) = plan_part_for(&selection, &cfg) {
        match client.fetch_shift_plan(&part.number) {
            Ok(plan) => println!(
                "  {} {}   {} {}   {} {}   {}",
                "Plan:".bold(),
                plan.plan_display(),
                "Actual:".bold(),
                plan.actual_display(),
                "Attainment:".bold(),
                plan.attainment_pct()
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.1}%")),
                format!("({} {})", part.name, part.number).dimmed(),
            ),
            Err(e) => println!("  {} {e:#}", "Shift plan unavailable:".red()),
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// oeeview hourly
// ---------------------------------------------------------------------------

/// Show units per hour for the production day, and recent plan against
/// actual when reading from the backend.
pub fn run_hourly(format: OutputFormat, file: Option<&Path>) -> Result<()> {
    let cfg = config::load();
    let target = cfg.production.hourly_target;

    let (hourly, plan_actual): (HourlyProduction, Result<Vec<PlanActualRow>>) = match file {
        Some(path) => (read_json_file(path)?, Ok(Vec::new())),
        None => {
            let client = ApiClient::from_config(&cfg.api);
            (client.fetch_hourly_production()?, client.fetch_plan_actual())
        }
    };
    let buckets = hourly.hourly_buckets(target);

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = plan_actual
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|r| serde_json::json!({"label": r.label(), "plan": r.plan, "actual": r.actual}))
                .collect();
            let value = serde_json::json!({
                "target": target,
                "total": hourly.total(),
                "buckets": buckets,
                "plan_actual": rows,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("hour,count,meets_target");
            for b in &buckets {
                println!("{},{},{}", b.label, format_amount(b.count), b.meets_target);
            }
        }
        OutputFormat::Table => {
            println!(
                "{} {}",
                "Running Time".bold().cyan(),
                format!("(target {}/h)", format_amount(target)).dimmed()
            );
            println!("{}", "=".repeat(50));
            let max = buckets.iter().map(|b| b.count).fold(target, f64::max);
            for b in &buckets {
                let line = format!(
                    "  {}  {:<30} {:>6}",
                    b.label,
                    bar(b.count, max, 30),
                    format_amount(b.count)
                );
                if b.meets_target {
                    println!("{}", line.green());
                } else if b.count > 0.0 {
                    println!("{}", line.red());
                } else {
                    println!("{}", line.dimmed());
                }
            }
            let on_target = buckets.iter().filter(|b| b.meets_target).count();
            println!();
            println!(
                "  {} {}   {} {} of {}",
                "Total:".bold(),
                format_amount(hourly.total()),
                "Hours on target:".bold(),
                on_target,
                buckets.len()
            );

            match plan_actual {
                Ok(rows) if !rows.is_empty() => {
                    println!();
                    println!("{}", "Plan vs Actual".bold().cyan());
                    for r in &rows {
                        println!(
                            "  {:<22} {:>8} {:>8}",
                            r.label(),
                            format_amount(r.plan),
                            format_amount(r.actual)
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => println!("  {} {e:#}", "Plan vs actual unavailable:".red()),
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// oeeview history
// ---------------------------------------------------------------------------

/// Show OEE per shift, one row per day, oldest first.
pub fn run_history(format: OutputFormat, file: Option<&Path>) -> Result<()> {
    let records: Vec<OeeHistoryRecord> = match file {
        Some(path) => read_json_file(path)?,
        None => ApiClient::from_config(&config::load().api).fetch_oee_history()?,
    };
    let days = history::group_by_date(&records);
    if days.is_empty() {
        println!("{}", "No OEE history recorded.".yellow());
        return Ok(());
    }

    let cell = |v: Option<f64>| v.map_or_else(String::new, |n| format!("{n:.1}"));
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&days)?),
        OutputFormat::Csv => {
            println!("date,{}", SHIFTS.join(","));
            for day in &days {
                let cells: Vec<String> = SHIFTS.iter().map(|s| cell(day.shift(s))).collect();
                println!("{},{}", day.date, cells.join(","));
            }
        }
        OutputFormat::Table => {
            println!("{}", "OEE History".bold().cyan());
            println!("{}", "=".repeat(40));
            println!("  {:<12} {:>10} {:>10}", "Date", SHIFTS[0], SHIFTS[1]);
            println!("  {}", "-".repeat(34));
            for day in &days {
                let [a, b] = SHIFTS.map(|s| percent_cell(day.shift(s)));
                println!("  {:<12} {:>10} {:>10}", day.label, a, b);
            }
            println!();
            let [a, b] = SHIFTS.map(|s| percent_cell(history::shift_average(&days, s)));
            println!("  {:<12} {:>10} {:>10}", "Average".bold(), a, b);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// oeeview watch
// ---------------------------------------------------------------------------

/// Poll the backend and redraw the stoppage and rejection tables until the
/// user enters `q` or closes stdin.
pub fn run_watch(part: Option<&str>, interval_secs: Option<u64>) -> Result<()> {
    let cfg = config::load();
    let selection = selection_or_default(part, &cfg);
    let interval = Duration::from_secs(interval_secs.unwrap_or(cfg.poll.interval_secs).max(1));
    let client = ApiClient::from_config(&cfg.api);

    let stoppages = views::shared(StoppageView::new());
    let rejections = views::shared(RejectionView::new(selection));

    let mut pollers = vec![
        views::watch(stoppages.clone(), client.clone(), interval, cfg.logging.poll_log)?,
        views::watch(rejections.clone(), client, interval, cfg.logging.poll_log)?,
    ];

    let (quit_tx, quit_rx) = mpsc::channel::<()>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) if l.trim().eq_ignore_ascii_case("q") => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
        let _ = quit_tx.send(());
    });

    let mut drawn = (u64::MAX, u64::MAX);
    loop {
        let current = (
            views::read(&stoppages).freshness().applied_seq,
            views::read(&rejections).freshness().applied_seq,
        );
        if current != drawn {
            draw_watch(&stoppages, &rejections, interval)?;
            drawn = current;
        }

        match quit_rx.recv_timeout(Duration::from_millis(500)) {
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            _ => break,
        }
    }

    for poller in &mut pollers {
        poller.stop();
    }
    Ok(())
}

fn draw_watch(
    stoppages: &views::Shared<StoppageView>,
    rejections: &views::Shared<RejectionView>,
    interval: Duration,
) -> Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H")?;
    writeln!(
        out,
        "{} {}",
        "oeeview watch".bold().cyan(),
        format!("(refresh every {}s, enter q to quit)", interval.as_secs()).dimmed()
    )?;
    writeln!(out)?;

    {
        let view = views::read(stoppages);
        writeln!(out, "{}", STOPPAGE_HEADINGS.title.bold().cyan())?;
        write_bars(&mut out, view.pareto())?;
        write_freshness(&mut out, view.freshness())?;
    }
    writeln!(out)?;
    {
        let view = views::read(rejections);
        writeln!(
            out,
            "{} {}",
            REJECTION_HEADINGS.title.bold().cyan(),
            format!("({})", view.selection()).dimmed()
        )?;
        write_bars(&mut out, view.pareto())?;
        write_freshness(&mut out, view.freshness())?;
    }

    out.flush().context("failed to flush stdout")
}

fn write_bars(out: &mut impl Write, table: &ParetoTable) -> Result<()> {
    if table.is_empty() {
        writeln!(out, "  {}", "waiting for data…".dimmed())?;
        return Ok(());
    }

    let max = table
        .entries
        .iter()
        .map(|e| e.amount)
        .fold(0.0_f64, f64::max);
    for entry in table.entries.iter().take(12) {
        writeln!(
            out,
            "  {:<22} {:<30} {:>8} {:>6.1}%",
            truncate(&entry.category, 22),
            bar(entry.amount, max, 30),
            format_amount(entry.amount),
            entry.cumulative_percent,
        )?;
    }
    Ok(())
}

fn write_freshness(out: &mut impl Write, freshness: &views::Freshness) -> Result<()> {
    if let Some(at) = freshness.updated_at {
        let local = at.with_timezone(&chrono::Local);
        writeln!(out, "  {}", format!("updated {}", local.format("%H:%M:%S")).dimmed())?;
    }
    if let Some(err) = &freshness.last_error {
        writeln!(out, "  {} {}", "last poll failed:".red(), err)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// oeeview health
// ---------------------------------------------------------------------------

/// Check backend reachability, config sources and the poll log.
pub fn run_health() -> Result<()> {
    println!("{}", "oeeview Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.oeeview/config.toml found"
        } else {
            "not found (run `oeeview config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".oeeview.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = ApiClient::from_config(&cfg.api);
    let online = client.is_healthy();
    print_health_item(
        "Backend",
        online,
        &if online {
            format!("reachable at {}", client.base_url())
        } else {
            format!("not reachable at {}", client.base_url())
        },
    );
    print_health_item(
        "Poll interval",
        true,
        &format!("{}s", cfg.poll.interval_secs),
    );

    let recent = poll_log::read_recent(50);
    let tally = poll_log::tally(&recent);
    print_health_item(
        "Recent polls",
        tally.failures == 0,
        &if tally.total == 0 {
            "no poll log yet".to_string()
        } else {
            format!("{} of last {} failed", tally.failures, tally.total)
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// oeeview config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective oeeview Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for (label, path) in [
        ("~/.oeeview/config.toml", config::global_config_file()),
        (".oeeview.toml", config::project_config_file()),
    ] {
        if path.is_some_and(|p| p.exists()) {
            println!("  {} {}", "✓".green(), label.dimmed());
        } else {
            println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
        }
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "OEEVIEW_* environment variables".dimmed()
    );

    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Pareto output
// ---------------------------------------------------------------------------

fn print_pareto(
    table: &ParetoTable,
    headings: Headings,
    selection: Option<&PartSelection>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_pareto_json(table, selection)?,
        OutputFormat::Csv => print_pareto_csv(table),
        OutputFormat::Table => print_pareto_table(table, headings, selection),
    }
    Ok(())
}

fn print_pareto_table(table: &ParetoTable, headings: Headings, selection: Option<&PartSelection>) {
    println!("{}", table_title(headings, selection).bold().cyan());
    println!("{}", "=".repeat(64));
    println!(
        "  {:<28} {:>14} {:>14} {:>8}",
        headings.category, headings.amount, "Running total", "Cum. %"
    );
    println!("  {}", "-".repeat(62));

    let vital = table.vital_few(VITAL_FEW_THRESHOLD).len();
    for (i, entry) in table.entries.iter().enumerate() {
        let line = format!(
            "  {:<28} {:>14} {:>14} {:>7.1}%",
            truncate(&entry.category, 28),
            format_amount(entry.amount),
            format_amount(entry.running_total),
            entry.cumulative_percent,
        );
        if i < vital {
            println!("{}", line.bold());
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!();
    println!(
        "  {} {}   {} {} of {}",
        "Total:".bold(),
        format_amount(table.total_amount),
        "Vital few (≤80%):".bold(),
        vital,
        table.entries.len()
    );
}

fn table_title(headings: Headings, selection: Option<&PartSelection>) -> String {
    match selection {
        Some(sel) => format!("{}: {sel}", headings.title),
        None => headings.title.to_string(),
    }
}

fn print_pareto_json(table: &ParetoTable, selection: Option<&PartSelection>) -> Result<()> {
    let value = serde_json::json!({
        "part": selection.map(PartSelection::label),
        "total_amount": table.total_amount,
        "entries": table.entries,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_pareto_csv(table: &ParetoTable) {
    println!("category,amount,running_total,cumulative_percent,occurrences");
    for e in &table.entries {
        println!(
            "{},{},{},{:.1},{}",
            csv_field(&e.category),
            format_amount(e.amount),
            format_amount(e.running_total),
            e.cumulative_percent,
            e.occurrences.map(format_amount).unwrap_or_default(),
        );
    }
}

fn print_quality_line(quality: &QualitySummary) {
    println!(
        "  {} {}   {} {}   {} {:.1}%",
        "Good:".bold(),
        format_amount(quality.good),
        "Rejected:".bold(),
        format_amount(quality.rejected),
        "Rejection rate:".bold(),
        quality.rejection_pct(),
    );
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn selection_or_default(part: Option<&str>, cfg: &OeeviewConfig) -> PartSelection {
    PartSelection::parse(part.unwrap_or(&cfg.parts.default_selection))
}

fn part_label(selection: &PartSelection, cfg: &OeeviewConfig) -> String {
    match cfg.parts.number_for(selection.label()) {
        Some(number) => format!("{selection} ({number})"),
        None => selection.to_string(),
    }
}

/// The part whose shift plan to show: the selected part when it is a known
/// one, otherwise the configured default.
fn plan_part_for<'a>(selection: &PartSelection, cfg: &'a OeeviewConfig) -> Option<&'a PartInfo> {
    match selection {
        PartSelection::Part(name) => cfg
            .parts
            .known
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .or_else(|| cfg.parts.plan_part()),
        PartSelection::AllParts => cfg.parts.plan_part(),
    }
}

/// Read a saved response that is parsed as-is (no `data` wrapper).
fn read_json_file<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid payload in {}", path.display()))
}

fn read_payload_file<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file {}", path.display()))?;
    payload::parse_payload(&text).with_context(|| format!("invalid payload in {}", path.display()))
}

fn percent_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |n| format!("{n:.1}%"))
}

/// Format an amount without a trailing `.0` for whole numbers.
fn format_amount(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Horizontal bar of at most `width` cells proportional to `value / max`.
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
