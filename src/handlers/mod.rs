//! HTTP endpoint handlers for the host monitor.
//!
//! - `/api/metrics/*`: JSON query interface (history, live readings, hardware)
//! - `/health`: Sampler health table
//! - `/metrics`: Prometheus self-metrics
//! - `/`: Plain-text index

pub mod api;
pub mod health;
pub mod metrics;
pub mod root;

// Re-export handlers
pub use api::{
    api_not_found, cpu_handler, disks_handler, history_handler, memory_handler, network_handler,
    network_rates_handler, temperature_handler,
};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;
