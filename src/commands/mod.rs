//! CLI command implementations for herakles-host-monitor.
//!
//! - `check`: Tool and proc source validation
//! - `config`: Configuration file generation
//! - `test`: One-shot sampling and hardware query

pub mod check;
pub mod config;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use test::command_test;
