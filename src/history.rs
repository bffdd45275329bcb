//! Bounded time-series history for CPU, memory and network counters.
//!
//! `HistoryStore` owns every series behind a single lock. The sampler is the
//! only writer and applies one tick's results in a single write section, so a
//! reader's snapshot always sees either the previous tick or the complete
//! current one. Interface keys are fixed at construction.

use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ringbuffer::Ringbuffer;

/// Default number of points kept per series.
pub const DEFAULT_MAX_HISTORY_POINTS: usize = 60;

/// A single timestamped value. `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: i64,
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Capacity-bounded series with FIFO eviction.
pub type MetricSeries = Ringbuffer<MetricSample>;

/// Cumulative byte counters of one interface at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterReading {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Results of one sampling pass. `None` means the step failed this tick.
#[derive(Debug, Clone, Default)]
pub struct TickSamples {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub network: Option<HashMap<String, CounterReading>>,
}

#[derive(Debug, Clone)]
struct InterfaceHistory {
    rx_bytes: MetricSeries,
    tx_bytes: MetricSeries,
}

#[derive(Debug, Clone)]
struct MetricHistory {
    cpu: MetricSeries,
    memory: MetricSeries,
    network: BTreeMap<String, InterfaceHistory>,
    last_timestamp: Option<i64>,
}

/// Point-in-time copy of one interface's counter history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    pub rx_bytes: Vec<MetricSample>,
    pub tx_bytes: Vec<MetricSample>,
}

/// Point-in-time copy of the whole history, serialized as the dashboard expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub cpu: Vec<MetricSample>,
    pub memory: Vec<MetricSample>,
    pub network: BTreeMap<String, InterfaceSnapshot>,
}

/// Statistics about the history store.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub capacity: usize,
    pub series_count: usize,
    pub cpu_points: usize,
    pub memory_points: usize,
    pub estimated_ram_bytes: usize,
}

/// Owner of all historized series.
pub struct HistoryStore {
    inner: RwLock<MetricHistory>,
    capacity: usize,
}

impl HistoryStore {
    /// Creates a store with `capacity` points per series and one rx/tx pair
    /// for every interface name given.
    pub fn new<I, S>(capacity: usize, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let capacity = capacity.max(1);
        let network = interfaces
            .into_iter()
            .map(|name| {
                (
                    name.into(),
                    InterfaceHistory {
                        rx_bytes: MetricSeries::new(capacity),
                        tx_bytes: MetricSeries::new(capacity),
                    },
                )
            })
            .collect();

        Self {
            inner: RwLock::new(MetricHistory {
                cpu: MetricSeries::new(capacity),
                memory: MetricSeries::new(capacity),
                network,
                last_timestamp: None,
            }),
            capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MetricHistory> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MetricHistory> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Points kept per series.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Interface names tracked by this store, sorted.
    pub fn interfaces(&self) -> Vec<String> {
        self.read().network.keys().cloned().collect()
    }

    /// Appends one tick's samples atomically and returns the timestamp used.
    ///
    /// Timestamps are forced strictly increasing: a clock that did not advance
    /// (or stepped backwards) since the previous tick yields `previous + 1`.
    /// Counter readings for interfaces outside the fixed set are ignored.
    pub fn record(&self, timestamp_ms: i64, samples: &TickSamples) -> i64 {
        let mut history = self.write();

        let timestamp = match history.last_timestamp {
            Some(last) if timestamp_ms <= last => last + 1,
            _ => timestamp_ms,
        };

        let mut appended = false;

        if let Some(cpu) = samples.cpu {
            history.cpu.push(MetricSample::new(timestamp, cpu));
            appended = true;
        }

        if let Some(memory) = samples.memory {
            history.memory.push(MetricSample::new(timestamp, memory));
            appended = true;
        }

        if let Some(readings) = &samples.network {
            for (name, iface) in history.network.iter_mut() {
                if let Some(reading) = readings.get(name) {
                    iface
                        .rx_bytes
                        .push(MetricSample::new(timestamp, reading.rx_bytes as f64));
                    iface
                        .tx_bytes
                        .push(MetricSample::new(timestamp, reading.tx_bytes as f64));
                    appended = true;
                }
            }
        }

        if appended {
            history.last_timestamp = Some(timestamp);
        }
        timestamp
    }

    /// Returns a deep copy of every series in chronological order.
    pub fn snapshot(&self) -> HistorySnapshot {
        let history = self.read();
        HistorySnapshot {
            cpu: history.cpu.get_history(),
            memory: history.memory.get_history(),
            network: history
                .network
                .iter()
                .map(|(name, iface)| {
                    (
                        name.clone(),
                        InterfaceSnapshot {
                            rx_bytes: iface.rx_bytes.get_history(),
                            tx_bytes: iface.tx_bytes.get_history(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Returns statistics about the store.
    pub fn stats(&self) -> HistoryStats {
        let history = self.read();
        let series_count = 2 + history.network.len() * 2;
        HistoryStats {
            capacity: self.capacity,
            series_count,
            cpu_points: history.cpu.len(),
            memory_points: history.memory.len(),
            estimated_ram_bytes: series_count
                * self.capacity
                * std::mem::size_of::<MetricSample>(),
        }
    }
}
