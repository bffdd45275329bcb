//! Configuration management for herakles-host-monitor.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8721;
pub const DEFAULT_COLLECTION_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_MAX_HISTORY_POINTS: usize = herakles_host_monitor::history::DEFAULT_MAX_HISTORY_POINTS;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROC_ROOT: &str = "/proc";

const DEFAULT_LOCATIONS: [&str; 6] = [
    "/etc/herakles/host-monitor.yaml",
    "/etc/herakles/host-monitor.yml",
    "/etc/herakles/host-monitor.json",
    "./herakles-host-monitor.yaml",
    "./herakles-host-monitor.yml",
    "./herakles-host-monitor.json",
];

/// Monitor configuration. Every field is optional; unset fields fall back to
/// the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Sampling
    #[serde(alias = "collection-interval-secs")]
    pub collection_interval_secs: Option<u64>,
    #[serde(alias = "max-history-points")]
    pub max_history_points: Option<usize>,
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    // External tools
    #[serde(alias = "command-timeout-secs")]
    pub command_timeout_secs: Option<u64>,
    /// Prefix SMART and NVMe tools with `sudo -n`
    #[serde(alias = "use-sudo")]
    pub use_sudo: Option<bool>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,
    #[serde(alias = "enable-telemetry")]
    pub enable_telemetry: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            collection_interval_secs: Some(DEFAULT_COLLECTION_INTERVAL_SECS),
            max_history_points: Some(DEFAULT_MAX_HISTORY_POINTS),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            command_timeout_secs: Some(DEFAULT_COMMAND_TIMEOUT_SECS),
            use_sudo: Some(false),
            enable_health: Some(true),
            enable_telemetry: Some(true),
            log_level: Some("info".into()),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(
            self.collection_interval_secs
                .unwrap_or(DEFAULT_COLLECTION_INTERVAL_SECS),
        )
    }

    pub fn max_history_points(&self) -> usize {
        self.max_history_points.unwrap_or(DEFAULT_MAX_HISTORY_POINTS)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(
            self.command_timeout_secs
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
        )
    }

    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn use_sudo(&self) -> bool {
        self.use_sudo.unwrap_or(false)
    }

    pub fn health_enabled(&self) -> bool {
        self.enable_health.unwrap_or(true)
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.enable_telemetry.unwrap_or(true)
    }

    pub fn tls_enabled(&self) -> bool {
        self.enable_tls.unwrap_or(false)
    }

    /// Effective log level; unset or unknown names fall back to info.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(|name| LogLevel::from_str(name, true).ok())
            .unwrap_or(LogLevel::Info)
    }
}

fn check_tls_file(kind: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("TLS {} file not found: {}", kind, path).into());
    }
    match fs::metadata(p) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", kind, path).into()),
        Err(e) => Err(format!("TLS {} file is not readable: {} ({})", kind, path, e).into()),
        Ok(_) => Ok(()),
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.collection_interval_secs == Some(0) {
        return Err("collection_interval_secs must be at least 1".into());
    }
    if cfg.max_history_points == Some(0) {
        return Err("max_history_points must be at least 1".into());
    }
    if cfg.command_timeout_secs == Some(0) {
        return Err("command_timeout_secs must be at least 1".into());
    }

    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}' (expected off, error, warn, info, debug or trace)",
                level
            )
            .into());
        }
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", bind).into());
        }
    }

    // TLS validation
    if cfg.tls_enabled() {
        match (cfg.tls_cert_path.as_deref(), cfg.tls_key_path.as_deref()) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_tls_file("certificate", cert)?;
                check_tls_file("private key", key)?;
            }
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }
    if let Some(interval) = args.interval {
        config.collection_interval_secs = Some(interval);
    }
    if let Some(points) = args.history_points {
        config.max_history_points = Some(points);
    }
    if let Some(timeout) = args.command_timeout {
        config.command_timeout_secs = Some(timeout);
    }
    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if args.use_sudo {
        config.use_sudo = Some(true);
    }
    if let Some(level) = args.log_level.as_ref().and_then(|l| l.to_possible_value()) {
        config.log_level = Some(level.get_name().to_string());
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_telemetry {
        config.enable_telemetry = Some(false);
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Path of the first existing default configuration file.
pub fn find_default_config() -> Option<PathBuf> {
    DEFAULT_LOCATIONS
        .iter()
        .find(|p| Path::new(p).exists())
        .map(PathBuf::from)
}

/// Loads a configuration file, choosing the format by extension.
/// Without an explicit path the default locations are tried; when none
/// exists the defaults are returned. An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(format!("Config file not found: {}", p.display()).into());
        }
        Some(p) => p.to_path_buf(),
        None => match find_default_config() {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Serializes configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
