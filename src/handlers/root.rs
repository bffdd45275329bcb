//! Root endpoint handler listing the available endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

const ENDPOINTS: [(&str, &str); 7] = [
    ("/api/metrics/history", "CPU, memory and network counter history"),
    ("/api/metrics/cpu", "Core count, load averages and load percentage"),
    ("/api/metrics/memory", "Total, free and used memory"),
    ("/api/metrics/network", "Latest counters per interface"),
    ("/api/metrics/network/rates", "Byte rates derived from history"),
    ("/api/metrics/temperature", "CPU, GPU, system and drive temperatures"),
    ("/api/metrics/disks", "Disks with partition usage and SMART data"),
];

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let uptime_secs = state.start_time.elapsed().as_secs();
    let config = &state.config;

    let mut out = String::new();
    writeln!(out, "herakles-host-monitor {}", env!("CARGO_PKG_VERSION")).ok();
    writeln!(out, "built {}", env!("VERGEN_BUILD_TIMESTAMP")).ok();
    writeln!(
        out,
        "uptime {}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    )
    .ok();
    writeln!(
        out,
        "sampling every {}s, {} points per series",
        config.collection_interval().as_secs(),
        config.max_history_points()
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "ENDPOINTS").ok();
    writeln!(out, "---------").ok();
    for (path, description) in ENDPOINTS {
        writeln!(out, "{:30} {}", path, description).ok();
    }
    if config.health_enabled() {
        writeln!(out, "{:30} {}", "/health", "Sampler health statistics").ok();
    }
    if config.telemetry_enabled() {
        writeln!(out, "{:30} {}", "/metrics", "Prometheus self-metrics").ok();
    }
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        out,
    )
}
