//! Health check endpoint handler.
//!
//! Returns the sampler and HTTP statistics as a plain-text table. The status
//! is 503 until the first sampling pass has completed.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use std::sync::atomic::Ordering;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str =
    "Project: https://github.com/cansp-dev/herakles-host-monitor | More info: https://www.herakles.now";

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");
    state.health_stats.record_http_request();

    let ticks = state.health_stats.ticks_completed.load(Ordering::Relaxed);
    let (status, message) = if ticks > 0 {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Waiting for first sampling pass")
    };

    let uptime_hours = state.health_stats.get_uptime_seconds() as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let table = state.health_stats.render_table();
    let history = render_history_stats(&state);

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nUptime: {uptime_str}\n\n{table}\n{history}\n{FOOTER_TEXT}"),
    )
}

fn render_history_stats(state: &SharedState) -> String {
    let stats = state.query.store().stats();
    let mut out = String::new();
    writeln!(out, "HISTORY STORE").ok();
    writeln!(out, "=============").ok();
    writeln!(out).ok();
    writeln!(out, "{:26} | {:>12}", "capacity (points)", stats.capacity).ok();
    writeln!(out, "{:26} | {:>12}", "series", stats.series_count).ok();
    writeln!(out, "{:26} | {:>12}", "cpu_points", stats.cpu_points).ok();
    writeln!(out, "{:26} | {:>12}", "memory_points", stats.memory_points).ok();
    writeln!(
        out,
        "{:26} | {:>12}",
        "estimated_ram (KB)",
        stats.estimated_ram_bytes / 1024
    )
    .ok();
    out
}
