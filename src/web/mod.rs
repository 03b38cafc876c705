//! Embedded web dashboard for oeeview.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard with the stoppage and rejection Pareto charts,
//!   hourly running time, OEE history and the shift's plan against actual
//! - JSON API endpoints backed by the polled views
//!
//! Launched via `oeeview web` (default: `http://127.0.0.1:9760`). Each view
//! is refreshed by its own poller for as long as the server runs. Backend
//! health is polled too, on its own interval, so no request handler ever
//! calls the backend.

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::config::OeeviewConfig;
use crate::payload::PartSelection;
use crate::views::{
    self, GaugeView, HealthView, HistoryView, OutputView, RejectionView, RunningTimeView, Shared,
    StoppageView,
};

/// Everything a request handler can read.
pub struct Dashboard {
    pub(crate) config: OeeviewConfig,
    pub(crate) client: ApiClient,
    pub(crate) stoppages: Shared<StoppageView>,
    pub(crate) rejections: Shared<RejectionView>,
    pub(crate) gauges: Shared<GaugeView>,
    pub(crate) running_time: Shared<RunningTimeView>,
    pub(crate) history: Shared<HistoryView>,
    pub(crate) output: Shared<OutputView>,
    pub(crate) health: Shared<HealthView>,
}

impl Dashboard {
    pub fn new(config: OeeviewConfig) -> Self {
        let client = ApiClient::from_config(&config.api);
        let selection = PartSelection::parse(&config.parts.default_selection);
        let plan_part = config.parts.plan_part().cloned();
        let target = config.production.hourly_target;
        Self {
            config,
            client,
            stoppages: views::shared(StoppageView::new()),
            rejections: views::shared(RejectionView::new(selection)),
            gauges: views::shared(GaugeView::new()),
            running_time: views::shared(RunningTimeView::new(target)),
            history: views::shared(HistoryView::new()),
            output: views::shared(OutputView::new(plan_part)),
            health: views::shared(HealthView::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server and the view pollers.
///
/// Blocks the current thread. Requests are handled sequentially, which is
/// enough for a single-operator dashboard. A failing handler answers 500 and
/// the server keeps running.
pub fn serve(config: OeeviewConfig) -> Result<()> {
    let addr = config.web.addr.clone();
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let dashboard = Dashboard::new(config);
    let interval = dashboard.config.poll.interval();
    let poll_log = dashboard.config.logging.poll_log;
    let client = &dashboard.client;

    // Pollers live as long as this scope; dropping them stops the refresh.
    let _pollers = [
        views::watch(dashboard.stoppages.clone(), client.clone(), interval, poll_log)?,
        views::watch(dashboard.rejections.clone(), client.clone(), interval, poll_log)?,
        views::watch(dashboard.gauges.clone(), client.clone(), interval, poll_log)?,
        views::watch(dashboard.running_time.clone(), client.clone(), interval, poll_log)?,
        views::watch(dashboard.history.clone(), client.clone(), interval, poll_log)?,
        views::watch(dashboard.output.clone(), client.clone(), interval, poll_log)?,
        // health checks stay out of the poll log
        views::watch(
            dashboard.health.clone(),
            client.clone(),
            dashboard.config.poll.health_interval(),
            false,
        )?,
    ];

    println!("oeeview dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");
    info!(addr = %addr, backend = dashboard.client.base_url(), "dashboard started");

    if dashboard.config.web.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let resp = match dispatch(&dashboard, &method, &url) {
            Ok(resp) => resp,
            Err(e) => error_response(&e),
        };
        let _ = request.respond(resp);

        debug!(method = %method, url = %url, "request served");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(dashboard: &Dashboard, method: &Method, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        (&Method::Get, "/api/pareto/stoppages") => api::get_stoppages(dashboard),
        (&Method::Get, "/api/pareto/rejections") => api::get_rejections(dashboard, url),
        (&Method::Get, "/api/summary") => api::get_summary(dashboard, url),
        (&Method::Get, "/api/parts") => api::get_parts(dashboard),
        (&Method::Get, "/api/running-time") => api::get_running_time(dashboard),
        (&Method::Get, "/api/oee-history") => api::get_oee_history(dashboard),
        (&Method::Get, "/api/output") => api::get_output(dashboard),
        (&Method::Get, "/api/health") => api::get_health(dashboard),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn error_response(error: &anyhow::Error) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": format!("{error:#}") }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(500))
}

pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8")
        .expect("static header is valid")
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("static header is valid")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
