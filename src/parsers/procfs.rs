//! Parsers for /proc/loadavg, /proc/meminfo and /proc/net/dev.

use ahash::AHashMap as HashMap;

use crate::error::CollectError;

/// System load averages for 1, 5, and 15 minute intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    pub one_min: f64,
    pub five_min: f64,
    pub fifteen_min: f64,
}

/// Total and available memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryInfo {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }
}

/// Cumulative counters of one network interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetDevStats {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
}

/// Parses /proc/loadavg.
///
/// Format: "0.00 0.01 0.05 1/234 5678"
pub fn parse_loadavg(content: &str) -> Result<LoadAverage, CollectError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(CollectError::parse(
            "/proc/loadavg",
            format!("expected at least 3 fields, got {}", parts.len()),
        ));
    }

    let field = |idx: usize, label: &str| {
        parts[idx].parse::<f64>().map_err(|e| {
            CollectError::parse("/proc/loadavg", format!("{} load average: {}", label, e))
        })
    };

    Ok(LoadAverage {
        one_min: field(0, "1min")?,
        five_min: field(1, "5min")?,
        fifteen_min: field(2, "15min")?,
    })
}

/// Parses MemTotal and MemAvailable from /proc/meminfo.
pub fn parse_meminfo(content: &str) -> Result<MemoryInfo, CollectError> {
    let mut total_bytes: Option<u64> = None;
    let mut available_bytes: Option<u64> = None;

    for line in content.lines() {
        let slot = if line.starts_with("MemTotal:") {
            &mut total_bytes
        } else if line.starts_with("MemAvailable:") {
            &mut available_bytes
        } else {
            continue;
        };

        if let Some(kb) = line
            .split_whitespace()
            .nth(1)
            .and_then(|v| v.parse::<u64>().ok())
        {
            let bytes = kb.checked_mul(1024).ok_or_else(|| {
                CollectError::parse("/proc/meminfo", format!("value out of range: {}", line.trim()))
            })?;
            *slot = Some(bytes);
        }

        if total_bytes.is_some() && available_bytes.is_some() {
            break;
        }
    }

    match (total_bytes, available_bytes) {
        (Some(total_bytes), Some(available_bytes)) if total_bytes > 0 => Ok(MemoryInfo {
            total_bytes,
            available_bytes,
        }),
        (Some(0), _) => Err(CollectError::parse("/proc/meminfo", "MemTotal is zero")),
        _ => Err(CollectError::parse(
            "/proc/meminfo",
            "MemTotal or MemAvailable missing",
        )),
    }
}

/// Parses /proc/net/dev into a map of interface name to counters.
///
/// Header lines and malformed lines are skipped.
pub fn parse_netdev(content: &str) -> HashMap<String, NetDevStats> {
    let mut stats = HashMap::new();

    for line in content.lines() {
        // Split by ':' to separate interface name from stats
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };

        let interface = name.trim();
        if interface.is_empty() || interface.contains('|') {
            continue;
        }

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 10 {
            continue; // Skip malformed lines
        }

        stats.insert(
            interface.to_string(),
            NetDevStats {
                rx_bytes: values[0].parse().unwrap_or(0),
                rx_packets: values[1].parse().unwrap_or(0),
                tx_bytes: values[8].parse().unwrap_or(0),
                tx_packets: values[9].parse().unwrap_or(0),
            },
        );
    }

    stats
}

/// CPU load as a percentage of available cores, clamped to [0, 100].
pub fn cpu_load_percent(load_one_min: f64, cpu_count: usize) -> f64 {
    let cores = cpu_count.max(1) as f64;
    ((load_one_min / cores) * 100.0).clamp(0.0, 100.0)
}

/// Memory in use as a percentage of total.
pub fn memory_usage_percent(info: &MemoryInfo) -> f64 {
    if info.total_bytes == 0 {
        return 0.0;
    }
    (info.used_bytes() as f64 / info.total_bytes as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETDEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  123456     100    0    0    0     0          0         0   123456     100    0    0    0     0       0          0
  eth0: 9876543    5000    1    2    0     0          0        10  1234567    4000    0    0    0     0       0          0
wlan0: 42 3 0 0 0 0 0 0 84 6 0 0 0 0 0 0
";

    #[test]
    fn test_parse_loadavg() {
        let load = parse_loadavg("0.52 0.58 0.59 1/467 12345\n").unwrap();
        assert_eq!(load.one_min, 0.52);
        assert_eq!(load.five_min, 0.58);
        assert_eq!(load.fifteen_min, 0.59);
    }

    #[test]
    fn test_parse_loadavg_invalid() {
        assert!(parse_loadavg("").is_err());
        assert!(parse_loadavg("abc 1 2").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "MemTotal:       16000000 kB\nMemFree:         1000000 kB\nMemAvailable:    4000000 kB\n";
        let info = parse_meminfo(content).unwrap();
        assert_eq!(info.total_bytes, 16_000_000 * 1024);
        assert_eq!(info.available_bytes, 4_000_000 * 1024);
        assert_eq!(memory_usage_percent(&info), 75.0);
    }

    #[test]
    fn test_parse_meminfo_missing_available() {
        assert!(parse_meminfo("MemTotal: 100 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: 0 kB\nMemAvailable: 0 kB\n").is_err());
    }

    #[test]
    fn test_parse_meminfo_overflowing_value() {
        let content = format!("MemTotal: {} kB\nMemAvailable: 100 kB\n", u64::MAX / 512);
        let err = parse_meminfo(&content).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_parse_netdev() {
        let stats = parse_netdev(NETDEV);
        assert_eq!(stats.len(), 3);
        let eth0 = stats["eth0"];
        assert_eq!(eth0.rx_bytes, 9_876_543);
        assert_eq!(eth0.rx_packets, 5000);
        assert_eq!(eth0.tx_bytes, 1_234_567);
        assert_eq!(eth0.tx_packets, 4000);
        assert_eq!(stats["wlan0"].tx_bytes, 84);
    }

    #[test]
    fn test_cpu_load_percent_clamped() {
        assert_eq!(cpu_load_percent(1.0, 4), 25.0);
        assert_eq!(cpu_load_percent(12.0, 4), 100.0);
        assert_eq!(cpu_load_percent(-1.0, 4), 0.0);
        assert_eq!(cpu_load_percent(0.5, 0), 50.0);
    }
}
