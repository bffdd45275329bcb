//! Periodic sampler that feeds the history store.
//!
//! One pass reads CPU load, memory usage and network counters through a
//! `HostProbe` and records them with a single timestamp. Passes never overlap:
//! a tick that fires while the previous pass is still running is skipped.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::collectors::host::{without_loopback, HostProbe};
use crate::error::CollectError;
use crate::health_stats::{HealthStats, SampledMetric};
use crate::history::{CounterReading, HistoryStore, TickSamples};

/// Default time between passes.
pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_secs(5);

/// Whether a pass is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

/// Lists the interfaces to historize: everything the probe reports except
/// loopback, sorted by name.
pub async fn discover_interfaces(probe: &dyn HostProbe) -> Result<Vec<String>, CollectError> {
    let counters = without_loopback(probe.network_counters().await?);
    let mut names: Vec<String> = counters.into_keys().collect();
    names.sort();
    Ok(names)
}

/// Single writer of the history store.
pub struct Sampler {
    probe: Arc<dyn HostProbe>,
    store: Arc<HistoryStore>,
    stats: Arc<HealthStats>,
    interval: Duration,
    step_timeout: Duration,
    busy: AtomicBool,
}

impl Sampler {
    pub fn new(
        probe: Arc<dyn HostProbe>,
        store: Arc<HistoryStore>,
        stats: Arc<HealthStats>,
        interval: Duration,
    ) -> Self {
        stats.set_tracked_interfaces(store.interfaces().len());
        Self {
            probe,
            store,
            stats,
            interval,
            step_timeout: interval,
            busy: AtomicBool::new(false),
        }
    }

    /// Budget for each individual step of a pass. Defaults to the interval.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    pub fn state(&self) -> SamplerState {
        if self.busy.load(Ordering::Acquire) {
            SamplerState::Sampling
        } else {
            SamplerState::Idle
        }
    }

    async fn step<T, F>(&self, metric: SampledMetric, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, CollectError>>,
    {
        let result = match tokio::time::timeout(self.step_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CollectError::Timeout),
        };
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    "Skipping {} sample this tick ({}): {}",
                    metric.as_str(),
                    e.kind(),
                    e
                );
                self.stats.record_failure(metric);
                None
            }
        }
    }

    /// Runs one sampling pass.
    ///
    /// Returns the timestamp the samples were recorded under, or `None` when
    /// the pass was skipped because another one is still running. A failing
    /// step only drops its own metric for this tick.
    #[instrument(skip(self))]
    pub async fn tick(&self) -> Option<i64> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous sampling pass still running, skipping tick");
            self.stats.record_skipped_tick();
            return None;
        }

        let start = Instant::now();

        let cpu = self
            .step(SampledMetric::Cpu, self.probe.cpu_load_percent())
            .await;
        let memory = self
            .step(SampledMetric::Memory, self.probe.memory_usage_percent())
            .await;
        let network = self
            .step(SampledMetric::Network, self.probe.network_counters())
            .await
            .map(|counters| {
                counters
                    .into_iter()
                    .map(|(name, c)| {
                        (
                            name,
                            CounterReading {
                                rx_bytes: c.rx_bytes,
                                tx_bytes: c.tx_bytes,
                            },
                        )
                    })
                    .collect()
            });

        let samples = TickSamples {
            cpu,
            memory,
            network,
        };
        let timestamp = self
            .store
            .record(chrono::Utc::now().timestamp_millis(), &samples);

        let elapsed = start.elapsed().as_secs_f64();
        self.stats.record_tick(elapsed);
        debug!("Sampling pass finished in {:.3}s", elapsed);

        self.busy.store(false, Ordering::Release);
        Some(timestamp)
    }

    /// Fires a pass every interval until `shutdown` resolves.
    ///
    /// Each pass runs as its own task so a slow pass does not delay the timer;
    /// the busy flag turns overlapping ticks into skips.
    pub async fn run<S>(self: Arc<Self>, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Sampler started: interval {}s, {} points per series, {} interfaces",
            self.interval.as_secs_f64(),
            self.store.capacity(),
            self.store.interfaces().len()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sampler = Arc::clone(&self);
                    tokio::spawn(async move {
                        sampler.tick().await;
                    });
                }
                _ = &mut shutdown => {
                    info!("Sampler stopping");
                    break;
                }
            }
        }
    }
}
