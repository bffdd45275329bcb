//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Writes the default configuration to `output`, or stdout when it is
/// absent or `-`.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut content = render_config(&Config::default(), &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    match output {
        Some(path) if path.to_string_lossy() != "-" => {
            fs::write(&path, content)?;
            println!("✅ Configuration written to: {}", path.display());
        }
        _ => print!("{}", content),
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles Host Monitor Configuration
# ===================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 8721                   # HTTP port
#
# Sampling
# --------
# collection_interval_secs: 5  # Seconds between sampling passes
# max_history_points: 60       # Points kept per series (cpu, memory, each interface rx/tx)
# proc_root: "/proc"           # Where loadavg, meminfo and net/dev are read from
#
# External Tools
# --------------
# command_timeout_secs: 10     # Per-invocation timeout for sensors, smartctl, nvme, lsblk, df
# use_sudo: false              # Run smartctl and nvme through `sudo -n`
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
# enable_telemetry: true       # Enable /metrics self-telemetry
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
#
# TLS/SSL Configuration
# ---------------------
# enable_tls: false            # Enable HTTPS (default: false)
# tls_cert_path: null          # Path to TLS certificate (PEM format)
# tls_key_path: null           # Path to TLS private key (PEM format)
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.yaml");
        command_config(Some(path.clone()), ConfigFormat::Yaml, true).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Herakles Host Monitor Configuration"));

        let cfg = crate::config::load_config(Some(&path)).unwrap();
        assert_eq!(cfg.port(), crate::config::DEFAULT_PORT);
        assert_eq!(cfg.max_history_points(), 60);
    }
}
