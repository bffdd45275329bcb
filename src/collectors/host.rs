//! Host probe: CPU load, memory usage and network counters from /proc.
//!
//! `HostProbe` is the seam the sampler reads through; `ProcfsProbe` is the
//! real implementation and can be pointed at any directory laid out like /proc.

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::CollectError;
use crate::parsers::procfs::{
    cpu_load_percent, memory_usage_percent, parse_loadavg, parse_meminfo, parse_netdev,
    LoadAverage, MemoryInfo, NetDevStats,
};

/// Loopback is never tracked.
pub const LOOPBACK_INTERFACE: &str = "lo";

/// Drops the loopback interface from a counter map.
pub fn without_loopback(mut stats: HashMap<String, NetDevStats>) -> HashMap<String, NetDevStats> {
    stats.remove(LOOPBACK_INTERFACE);
    stats
}

/// Source of host health signals.
#[async_trait]
pub trait HostProbe: Send + Sync {
    async fn load_average(&self) -> Result<LoadAverage, CollectError>;

    async fn memory_info(&self) -> Result<MemoryInfo, CollectError>;

    /// Cumulative counters of every interface, loopback included.
    async fn network_counters(&self) -> Result<HashMap<String, NetDevStats>, CollectError>;

    /// Number of online CPU cores.
    fn cpu_count(&self) -> usize;

    /// 1-minute load average relative to the core count, clamped to [0, 100].
    async fn cpu_load_percent(&self) -> Result<f64, CollectError> {
        let load = self.load_average().await?;
        Ok(cpu_load_percent(load.one_min, self.cpu_count()))
    }

    /// `(total - available) / total * 100`.
    async fn memory_usage_percent(&self) -> Result<f64, CollectError> {
        let info = self.memory_info().await?;
        Ok(memory_usage_percent(&info))
    }
}

/// Reads the pseudo-filesystem under `root`.
#[derive(Debug, Clone)]
pub struct ProcfsProbe {
    root: PathBuf,
    cpu_count: usize,
}

impl ProcfsProbe {
    /// Probe over `root` using the number of cores available to this process.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_cpu_count(root, cpu_count)
    }

    pub fn with_cpu_count(root: impl Into<PathBuf>, cpu_count: usize) -> Self {
        Self {
            root: root.into(),
            cpu_count: cpu_count.max(1),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths the probe depends on, for startup checks.
    pub fn source_paths(&self) -> [PathBuf; 3] {
        [
            self.root.join("loadavg"),
            self.root.join("meminfo"),
            self.root.join("net/dev"),
        ]
    }

    async fn read(&self, relative: &str) -> Result<String, CollectError> {
        let path = self.root.join(relative);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CollectError::Io { path, source })
    }
}

#[async_trait]
impl HostProbe for ProcfsProbe {
    async fn load_average(&self) -> Result<LoadAverage, CollectError> {
        parse_loadavg(&self.read("loadavg").await?)
    }

    async fn memory_info(&self) -> Result<MemoryInfo, CollectError> {
        parse_meminfo(&self.read("meminfo").await?)
    }

    async fn network_counters(&self) -> Result<HashMap<String, NetDevStats>, CollectError> {
        Ok(parse_netdev(&self.read("net/dev").await?))
    }

    fn cpu_count(&self) -> usize {
        self.cpu_count
    }
}
