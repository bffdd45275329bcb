//! Health statistics for the monitor itself.
//!
//! Tracks sampler pass performance, per-metric failures and HTTP request
//! rates. Rendered as a plain-text table by the `/health` endpoint.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// `(last, avg, max, min, count)`
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Sliding window of HTTP request instants.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Keep ten minutes at most
            if let Some(cutoff) = now.checked_sub(Duration::from_secs(600)) {
                while guard.front().is_some_and(|&t| t < cutoff) {
                    guard.pop_front();
                }
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        let Ok(guard) = self.inner.lock() else {
            return 0;
        };
        match Instant::now().checked_sub(Duration::from_secs(60)) {
            Some(cutoff) => guard.iter().filter(|&&t| t >= cutoff).count() as u64,
            None => guard.len() as u64,
        }
    }
}

/// Which metric a sampler step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampledMetric {
    Cpu,
    Memory,
    Network,
}

impl SampledMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampledMetric::Cpu => "cpu",
            SampledMetric::Memory => "memory",
            SampledMetric::Network => "network",
        }
    }
}

/// Health statistics for the sampler and the HTTP surface.
pub struct HealthStats {
    pub ticks_completed: AtomicU64,
    pub ticks_skipped: AtomicU64,
    pub pass_duration_seconds: Stat,

    pub cpu_failures: AtomicU64,
    pub memory_failures: AtomicU64,
    pub network_failures: AtomicU64,

    pub tracked_interfaces: AtomicU64,

    pub http_request_timestamps: RequestTimestamps,
    pub http_requests_total: AtomicU64,

    last_tick_time: StdRwLock<Option<DateTime<Local>>>,
    start_time: Instant,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Self {
            ticks_completed: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            pass_duration_seconds: Stat::default(),
            cpu_failures: AtomicU64::new(0),
            memory_failures: AtomicU64::new(0),
            network_failures: AtomicU64::new(0),
            tracked_interfaces: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            http_requests_total: AtomicU64::new(0),
            last_tick_time: StdRwLock::new(None),
            start_time: Instant::now(),
        }
    }

    /// Records a finished sampler pass.
    pub fn record_tick(&self, duration_secs: f64) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
        self.pass_duration_seconds.add_sample(duration_secs);
        if let Ok(mut guard) = self.last_tick_time.write() {
            *guard = Some(Local::now());
        }
    }

    /// Records a tick dropped because the previous pass was still running.
    pub fn record_skipped_tick(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, metric: SampledMetric) {
        let counter = match metric {
            SampledMetric::Cpu => &self.cpu_failures,
            SampledMetric::Memory => &self.memory_failures,
            SampledMetric::Network => &self.network_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failures(&self, metric: SampledMetric) -> u64 {
        match metric {
            SampledMetric::Cpu => self.cpu_failures.load(Ordering::Relaxed),
            SampledMetric::Memory => self.memory_failures.load(Ordering::Relaxed),
            SampledMetric::Network => self.network_failures.load(Ordering::Relaxed),
        }
    }

    pub fn set_tracked_interfaces(&self, count: usize) {
        self.tracked_interfaces.store(count as u64, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_timestamps.record();
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn get_uptime_hours(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() / 3600.0
    }

    pub fn get_last_tick_time_str(&self) -> String {
        match self.last_tick_time.read() {
            Ok(guard) => guard
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            Err(_) => "N/A".to_string(),
        }
    }

    /// Share of ticks that ran, in percent.
    pub fn get_tick_success_rate(&self) -> f64 {
        let done = self.ticks_completed.load(Ordering::Relaxed);
        let skipped = self.ticks_skipped.load(Ordering::Relaxed);
        let total = done + skipped;
        if total == 0 {
            100.0
        } else {
            (done as f64 / total as f64) * 100.0
        }
    }

    pub fn render_table(&self) -> String {
        let (pd_cur, pd_avg, pd_max, pd_min, _) = self.pass_duration_seconds.snapshot();
        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - HOST MONITOR INTERNAL STATS").ok();
        writeln!(out, "==============================================").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "SAMPLER").ok();
        writeln!(out, "-------").ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "pass_duration (s)",
            format!("{:.3}", pd_cur),
            format!("{:.3}", pd_avg),
            format!("{:.3}", pd_max),
            format!("{:.3}", pd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        let rows: [(&str, String); 7] = [
            (
                "ticks_completed",
                self.ticks_completed.load(Ordering::Relaxed).to_string(),
            ),
            (
                "ticks_skipped",
                self.ticks_skipped.load(Ordering::Relaxed).to_string(),
            ),
            (
                "tick_success_rate (%)",
                format!("{:.1}", self.get_tick_success_rate()),
            ),
            (
                "tracked_interfaces",
                self.tracked_interfaces.load(Ordering::Relaxed).to_string(),
            ),
            (
                "cpu_failures",
                self.failures(SampledMetric::Cpu).to_string(),
            ),
            (
                "memory_failures",
                self.failures(SampledMetric::Memory).to_string(),
            ),
            (
                "network_failures",
                self.failures(SampledMetric::Network).to_string(),
            ),
        ];
        for (label, value) in rows {
            writeln!(out, "{:left$} | {:^col$}", label, value, left = left_col, col = col_w).ok();
        }

        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        writeln!(
            out,
            "{:left$} | {:^col$}",
            "requests_last_minute",
            self.http_request_timestamps.count_last_minute(),
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:^col$}",
            "requests_total",
            self.http_requests_total.load(Ordering::Relaxed),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "SYSTEM").ok();
        writeln!(out, "------").ok();
        writeln!(
            out,
            "{:left$} | {:^col$}",
            "uptime (h)",
            format!("{:.2}", self.get_uptime_hours()),
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:^col$}",
            "last_tick",
            self.get_last_tick_time_str(),
            left = left_col,
            col = col_w
        )
        .ok();

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stat() {
        let mut s = RunningStat::default();
        s.add(2.0);
        s.add(4.0);
        s.add(1.0);
        assert_eq!(s.avg(), 7.0 / 3.0);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.last, 1.0);
    }

    #[test]
    fn test_failures_per_metric() {
        let stats = HealthStats::new();
        stats.record_failure(SampledMetric::Memory);
        stats.record_failure(SampledMetric::Memory);
        stats.record_failure(SampledMetric::Network);
        assert_eq!(stats.failures(SampledMetric::Cpu), 0);
        assert_eq!(stats.failures(SampledMetric::Memory), 2);
        assert_eq!(stats.failures(SampledMetric::Network), 1);
    }

    #[test]
    fn test_tick_success_rate() {
        let stats = HealthStats::new();
        assert_eq!(stats.get_tick_success_rate(), 100.0);
        stats.record_tick(0.01);
        stats.record_tick(0.02);
        stats.record_tick(0.03);
        stats.record_skipped_tick();
        assert_eq!(stats.get_tick_success_rate(), 75.0);
        assert_ne!(stats.get_last_tick_time_str(), "N/A");
    }

    #[test]
    fn test_render_table_sections() {
        let stats = HealthStats::new();
        stats.record_tick(0.5);
        stats.record_http_request();
        let table = stats.render_table();
        assert!(table.contains("SAMPLER"));
        assert!(table.contains("pass_duration (s)"));
        assert!(table.contains("HTTP SERVER"));
        assert!(table.contains("network_failures"));
    }
}
