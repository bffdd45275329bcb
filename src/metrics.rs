//! Prometheus self-metrics for the host monitor.
//!
//! Gauges mirror the latest sampled values and the sampler's own health
//! counters. They are refreshed from `HealthStats` and the history store on
//! every scrape, so the sampler never touches the registry.

use prometheus::{Gauge, GaugeVec, Opts, Registry};

use crate::health_stats::{HealthStats, SampledMetric};
use crate::history::HistorySnapshot;

/// Collection of Prometheus gauges exposed at `/metrics`.
#[derive(Clone)]
pub struct MonitorMetrics {
    pub cpu_load_percent: Gauge,
    pub memory_usage_percent: Gauge,
    pub pass_duration_seconds: Gauge,
    pub ticks_completed: Gauge,
    pub ticks_skipped: Gauge,
    pub sample_failures: GaugeVec, // labels: metric
    pub tracked_interfaces: Gauge,
    pub history_points: GaugeVec, // labels: series
    pub uptime_seconds: Gauge,
}

impl MonitorMetrics {
    /// Creates and registers all gauges with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let cpu_load_percent = Gauge::new(
            "herakles_host_cpu_load_percent",
            "Latest sampled CPU load (1m load average / cores, 0-100)",
        )?;
        let memory_usage_percent = Gauge::new(
            "herakles_host_memory_usage_percent",
            "Latest sampled memory usage (0-100)",
        )?;
        let pass_duration_seconds = Gauge::new(
            "herakles_host_monitor_pass_duration_seconds",
            "Duration of the last sampling pass in seconds",
        )?;
        let ticks_completed = Gauge::new(
            "herakles_host_monitor_ticks_completed",
            "Number of sampling passes completed",
        )?;
        let ticks_skipped = Gauge::new(
            "herakles_host_monitor_ticks_skipped",
            "Number of ticks skipped because a pass was still running",
        )?;
        let sample_failures = GaugeVec::new(
            Opts::new(
                "herakles_host_monitor_sample_failures",
                "Number of failed sampling steps per metric",
            ),
            &["metric"],
        )?;
        let tracked_interfaces = Gauge::new(
            "herakles_host_monitor_tracked_interfaces",
            "Number of network interfaces tracked in history",
        )?;
        let history_points = GaugeVec::new(
            Opts::new(
                "herakles_host_monitor_history_points",
                "Number of points currently stored per series",
            ),
            &["series"],
        )?;
        let uptime_seconds = Gauge::new(
            "herakles_host_monitor_uptime_seconds",
            "Seconds since the monitor started",
        )?;

        registry.register(Box::new(cpu_load_percent.clone()))?;
        registry.register(Box::new(memory_usage_percent.clone()))?;
        registry.register(Box::new(pass_duration_seconds.clone()))?;
        registry.register(Box::new(ticks_completed.clone()))?;
        registry.register(Box::new(ticks_skipped.clone()))?;
        registry.register(Box::new(sample_failures.clone()))?;
        registry.register(Box::new(tracked_interfaces.clone()))?;
        registry.register(Box::new(history_points.clone()))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            cpu_load_percent,
            memory_usage_percent,
            pass_duration_seconds,
            ticks_completed,
            ticks_skipped,
            sample_failures,
            tracked_interfaces,
            history_points,
            uptime_seconds,
        })
    }

    /// Copies the current stats and latest history points into the gauges.
    pub fn refresh(&self, stats: &HealthStats, history: &HistorySnapshot) {
        use std::sync::atomic::Ordering;

        if let Some(last) = history.cpu.last() {
            self.cpu_load_percent.set(last.value);
        }
        if let Some(last) = history.memory.last() {
            self.memory_usage_percent.set(last.value);
        }

        let (last_pass, _, _, _, _) = stats.pass_duration_seconds.snapshot();
        self.pass_duration_seconds.set(last_pass);
        self.ticks_completed
            .set(stats.ticks_completed.load(Ordering::Relaxed) as f64);
        self.ticks_skipped
            .set(stats.ticks_skipped.load(Ordering::Relaxed) as f64);

        for metric in [SampledMetric::Cpu, SampledMetric::Memory, SampledMetric::Network] {
            self.sample_failures
                .with_label_values(&[metric.as_str()])
                .set(stats.failures(metric) as f64);
        }

        self.tracked_interfaces.set(history.network.len() as f64);
        self.history_points
            .with_label_values(&["cpu"])
            .set(history.cpu.len() as f64);
        self.history_points
            .with_label_values(&["memory"])
            .set(history.memory.len() as f64);
        self.uptime_seconds.set(stats.get_uptime_seconds() as f64);
    }
}
