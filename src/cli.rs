//! CLI arguments and subcommands for herakles-host-monitor.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-host-monitor",
    about = "Host metrics sampler with bounded history and hardware telemetry",
    long_about = "Host metrics sampler with bounded history and hardware telemetry.\n\n\
                  Samples CPU load, memory usage and network counters at a fixed interval, \
                  keeps a bounded history per series, and serves temperatures and disk SMART \
                  data collected from lm-sensors, smartmontools and nvme-cli as JSON.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides the config file; default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Seconds between sampling passes
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Points kept per history series
    #[arg(long)]
    pub history_points: Option<usize>,

    /// Timeout in seconds for each external tool invocation
    #[arg(long)]
    pub command_timeout: Option<u64>,

    /// Root of the proc filesystem to read host counters from
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Run smartctl and nvme through `sudo -n`
    #[arg(long)]
    pub use_sudo: bool,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Disable /metrics self-telemetry
    #[arg(long)]
    pub disable_telemetry: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check external tools and proc sources
    Check {
        /// Only check the proc filesystem sources
        #[arg(long)]
        proc: bool,

        /// Only check external tools
        #[arg(long)]
        tools: bool,
    },

    /// Generate a configuration file
    Config {
        /// Output file path (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Prepend a commented description of every field (YAML only)
        #[arg(long)]
        commented: bool,
    },

    /// Run sampling passes and one hardware query, then print the results
    Test {
        /// Number of sampling passes
        #[arg(short = 'n', long, default_value_t = 3)]
        iterations: usize,

        /// Also query temperatures and disks
        #[arg(long)]
        hardware: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}
