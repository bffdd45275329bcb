//! Application state shared by the HTTP handlers.

use herakles_host_monitor::health_stats::HealthStats;
use herakles_host_monitor::metrics::MonitorMetrics;
use herakles_host_monitor::query::QueryService;
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub metrics: MonitorMetrics,
    pub query: QueryService,
    pub config: Arc<Config>,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
