use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use oeeview::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "oeeview")]
#[command(about = "Pareto analysis and production monitoring for an OEE backend")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank stoppage reasons by total downtime
    Stoppages {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Read a saved /api/monthly-runtime payload instead of polling the backend
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Rank rejection reasons for one part or all parts merged
    Rejections {
        /// Part name, or `all` for every part (default from config)
        #[arg(long)]
        part: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Read a saved /api/monthly-stats payload instead of polling the backend
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show units produced per hour against the hourly target
    Hourly {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Read a saved /api/hourly-production-data payload instead of polling the backend
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show OEE per shift for each recorded day
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Read a saved /api/oee-history payload instead of polling the backend
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Show availability, quality, OEE and the shift's plan against actual
    Summary {
        /// Part name, or `all` for every part (default from config)
        #[arg(long)]
        part: Option<String>,
    },
    /// Poll the backend and redraw both analyses in the terminal
    Watch {
        /// Part name, or `all` for every part (default from config)
        #[arg(long)]
        part: Option<String>,
        /// Seconds between polls (default from config)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Launch the web dashboard
    Web {
        /// Listen address (default from config)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// Check backend reachability, config and recent polls
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective merged configuration
    Show,
    /// Write a default ~/.oeeview/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `poll.interval_secs 30`
    Set { key: String, value: String },
    /// Restore ~/.oeeview/config.toml to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    init_tracing();

    match app.command {
        Commands::Stoppages { format, file } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stoppages(fmt, file.as_deref())
        }
        Commands::Rejections { part, format, file } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_rejections(part.as_deref(), fmt, file.as_deref())
        }
        Commands::Hourly { format, file } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_hourly(fmt, file.as_deref())
        }
        Commands::History { format, file } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, file.as_deref())
        }
        Commands::Summary { part } => cli::run_summary(part.as_deref()),
        Commands::Watch { part, interval } => cli::run_watch(part.as_deref(), interval),
        Commands::Web { addr, no_open } => {
            let mut cfg = config::load();
            if let Some(addr) = addr {
                cfg.web.addr = addr;
            }
            if no_open {
                cfg.web.open_browser = false;
            }
            web::serve(cfg)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

/// Diagnostics go to stderr so table/json/csv output stays pipeable.
/// `OEEVIEW_LOG` wins over `logging.level` from the config.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("OEEVIEW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config::load().logging.level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
