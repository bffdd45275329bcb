//! Herakles Host Monitor Library
//!
//! The collection and history engine behind `herakles-host-monitor`:
//!
//! - **Command gateway** (`command`): runs external tools with a timeout and
//!   classifies failures so callers can fall back to other sources
//! - **Parsers** (`parsers`): /proc files, lm-sensors, smartctl, nvme, lsblk
//!   and df output, each format tried as an ordered list of strategies
//! - **History** (`history`, `ringbuffer`): fixed-capacity series per metric
//!   and interface with FIFO eviction
//! - **Rates** (`rate`): per-second rates derived from cumulative counters
//! - **Sampler** (`sampler`): the periodic single writer of the history
//! - **Query** (`query`): read-only views serialized by the HTTP layer
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use herakles_host_monitor::collectors::host::{HostProbe, ProcfsProbe};
//! use herakles_host_monitor::health_stats::HealthStats;
//! use herakles_host_monitor::history::HistoryStore;
//! use herakles_host_monitor::sampler::{discover_interfaces, Sampler};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let probe: Arc<dyn HostProbe> = Arc::new(ProcfsProbe::new("/proc"));
//! let interfaces = discover_interfaces(probe.as_ref()).await?;
//! let store = Arc::new(HistoryStore::new(60, interfaces));
//! let sampler = Sampler::new(probe, store.clone(), Arc::new(HealthStats::new()), Duration::from_secs(5));
//!
//! sampler.tick().await;
//! println!("{} cpu points", store.snapshot().cpu.len());
//! # Ok(())
//! # }
//! ```

pub mod collectors;
pub mod command;
pub mod error;
pub mod health_stats;
pub mod history;
pub mod metrics;
pub mod parsers;
pub mod query;
pub mod rate;
pub mod ringbuffer;
pub mod sampler;

// Re-export main types for convenience
pub use command::{CommandError, CommandRunner, Invocation, SystemCommandRunner};
pub use error::{CollectError, ErrorKind};
pub use history::{HistorySnapshot, HistoryStore, MetricSample};
pub use query::QueryService;
pub use sampler::Sampler;
