//! Read-only query interface over the history store and live collectors.
//!
//! History and rates come from the store; CPU, memory, network interface,
//! temperature and disk views are computed fresh on every call.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::collectors::drives::{collect_disks, DiskInfo};
use crate::collectors::host::{without_loopback, HostProbe};
use crate::collectors::temperature::{collect_temperatures, TemperatureResponse};
use crate::command::CommandRunner;
use crate::error::CollectError;
use crate::history::{HistorySnapshot, HistoryStore, InterfaceSnapshot};
use crate::rate::derive_rates;

/// Live CPU view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuSnapshot {
    pub cpu_count: usize,
    /// 1, 5 and 15 minute load averages.
    pub load_avg: [f64; 3],
    /// Percentage with two decimals.
    pub load_percentage: String,
}

/// Live memory view in bytes. `free` is the memory available to new work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    /// Percentage with two decimals.
    pub percentage: String,
}

/// Latest raw counters of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceCounters {
    pub interface: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInterfaces {
    pub interfaces: Vec<InterfaceCounters>,
}

/// Per-interface rate series in bytes per second.
pub type NetworkRates = BTreeMap<String, InterfaceSnapshot>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskList {
    pub disks: Vec<DiskInfo>,
}

/// Entry point for every read the HTTP layer performs.
pub struct QueryService {
    store: Arc<HistoryStore>,
    probe: Arc<dyn HostProbe>,
    runner: Arc<dyn CommandRunner>,
    use_sudo: bool,
}

impl QueryService {
    pub fn new(
        store: Arc<HistoryStore>,
        probe: Arc<dyn HostProbe>,
        runner: Arc<dyn CommandRunner>,
        use_sudo: bool,
    ) -> Self {
        Self {
            store,
            probe,
            runner,
            use_sudo,
        }
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Deep copy of all historized series.
    pub fn get_history(&self) -> HistorySnapshot {
        self.store.snapshot()
    }

    pub async fn get_cpu(&self) -> Result<CpuSnapshot, CollectError> {
        let load = self.probe.load_average().await?;
        let cpu_count = self.probe.cpu_count();
        let percent = crate::parsers::procfs::cpu_load_percent(load.one_min, cpu_count);
        Ok(CpuSnapshot {
            cpu_count,
            load_avg: [load.one_min, load.five_min, load.fifteen_min],
            load_percentage: format!("{:.2}", percent),
        })
    }

    pub async fn get_memory(&self) -> Result<MemorySnapshot, CollectError> {
        let info = self.probe.memory_info().await?;
        Ok(MemorySnapshot {
            total: info.total_bytes,
            free: info.available_bytes,
            used: info.used_bytes(),
            percentage: format!(
                "{:.2}",
                crate::parsers::procfs::memory_usage_percent(&info)
            ),
        })
    }

    /// Current counters of every non-loopback interface, sorted by name.
    pub async fn get_network_interfaces(&self) -> Result<NetworkInterfaces, CollectError> {
        let counters = without_loopback(self.probe.network_counters().await?);
        let mut interfaces: Vec<InterfaceCounters> = counters
            .into_iter()
            .map(|(interface, c)| InterfaceCounters {
                interface,
                rx_bytes: c.rx_bytes,
                rx_packets: c.rx_packets,
                tx_bytes: c.tx_bytes,
                tx_packets: c.tx_packets,
            })
            .collect();
        interfaces.sort_by(|a, b| a.interface.cmp(&b.interface));
        Ok(NetworkInterfaces { interfaces })
    }

    /// Rates recomputed from the whole stored counter series on each call.
    pub fn get_network_rates(&self) -> NetworkRates {
        self.store
            .snapshot()
            .network
            .into_iter()
            .map(|(name, iface)| {
                (
                    name,
                    InterfaceSnapshot {
                        rx_bytes: derive_rates(&iface.rx_bytes),
                        tx_bytes: derive_rates(&iface.tx_bytes),
                    },
                )
            })
            .collect()
    }

    pub async fn get_temperatures(&self) -> TemperatureResponse {
        collect_temperatures(self.runner.as_ref(), self.use_sudo).await
    }

    pub async fn get_disks(&self) -> Result<DiskList, CollectError> {
        let disks = collect_disks(self.runner.as_ref(), self.use_sudo).await?;
        debug!("Collected {} disks", disks.len());
        Ok(DiskList { disks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::host::ProcfsProbe;
    use crate::command::{CommandError, Invocation};
    use crate::history::{CounterReading, TickSamples};
    use ahash::AHashMap as HashMap;
    use async_trait::async_trait;
    use std::fs;

    struct NoTools;

    #[async_trait]
    impl CommandRunner for NoTools {
        async fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
            Err(CommandError::ToolNotFound {
                tool: invocation.program.clone(),
            })
        }

        fn tool_available(&self, _tool: &str) -> bool {
            false
        }
    }

    fn service(dir: &tempfile::TempDir, store: Arc<HistoryStore>) -> QueryService {
        QueryService::new(
            store,
            Arc::new(ProcfsProbe::with_cpu_count(dir.path(), 2)),
            Arc::new(NoTools),
            false,
        )
    }

    fn fake_proc() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("loadavg"), "0.50 0.25 0.10 1/100 42\n").unwrap();
        fs::write(
            dir.path().join("meminfo"),
            "MemTotal: 3 kB\nMemFree: 1 kB\nMemAvailable: 2 kB\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("net")).unwrap();
        fs::write(
            dir.path().join("net/dev"),
            "Inter-|\n face |\n  wlan0: 9 1 0 0 0 0 0 0 8 2 0 0 0 0 0 0\n    lo: 5 5 0 0 0 0 0 0 5 5 0 0 0 0 0 0\n  eth0: 7 3 0 0 0 0 0 0 6 4 0 0 0 0 0 0\n",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_cpu_and_memory_snapshots() {
        let dir = fake_proc();
        let q = service(&dir, Arc::new(HistoryStore::new(3, Vec::<String>::new())));

        let cpu = q.get_cpu().await.unwrap();
        assert_eq!(cpu.cpu_count, 2);
        assert_eq!(cpu.load_avg, [0.5, 0.25, 0.1]);
        assert_eq!(cpu.load_percentage, "25.00");
        let json = serde_json::to_value(&cpu).unwrap();
        assert_eq!(json["cpuCount"], 2);
        assert_eq!(json["loadPercentage"], "25.00");

        let mem = q.get_memory().await.unwrap();
        assert_eq!(mem.total, 3072);
        assert_eq!(mem.free, 2048);
        assert_eq!(mem.used, 1024);
        assert_eq!(mem.percentage, "33.33");
    }

    #[tokio::test]
    async fn test_network_interfaces_sorted_without_loopback() {
        let dir = fake_proc();
        let q = service(&dir, Arc::new(HistoryStore::new(3, Vec::<String>::new())));
        let net = q.get_network_interfaces().await.unwrap();
        let names: Vec<&str> = net.interfaces.iter().map(|i| i.interface.as_str()).collect();
        assert_eq!(names, vec!["eth0", "wlan0"]);
        assert_eq!(net.interfaces[1].tx_packets, 2);
    }

    #[tokio::test]
    async fn test_network_rates_from_history() {
        let dir = fake_proc();
        let store = Arc::new(HistoryStore::new(3, ["eth0"]));
        for (ts, rx) in [(1_000, 40u64), (3_000, 100), (5_000, 10)] {
            let mut network = HashMap::new();
            network.insert(
                "eth0".to_string(),
                CounterReading {
                    rx_bytes: rx,
                    tx_bytes: 0,
                },
            );
            store.record(
                ts,
                &TickSamples {
                    network: Some(network),
                    ..Default::default()
                },
            );
        }

        let q = service(&dir, store);
        let rates = q.get_network_rates();
        let rx: Vec<f64> = rates["eth0"].rx_bytes.iter().map(|s| s.value).collect();
        assert_eq!(rx, vec![0.0, 30.0, 0.0]);
    }

    #[tokio::test]
    async fn test_disks_fail_without_lsblk() {
        let dir = fake_proc();
        let q = service(&dir, Arc::new(HistoryStore::new(3, Vec::<String>::new())));
        let err = q.get_disks().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ToolNotFound);
    }
}
