//! Startup requirement validation for herakles-host-monitor.
//!
//! Nothing here stops the monitor from starting: a missing tool or an
//! unreadable source only degrades the affected metric.

use nix::unistd::geteuid;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use herakles_host_monitor::collectors::host::ProcfsProbe;
use herakles_host_monitor::command::CommandRunner;

/// External tools the hardware collectors shell out to.
pub const HARDWARE_TOOLS: [(&str, &str); 5] = [
    ("sensors", "CPU/GPU/system temperatures (lm-sensors)"),
    ("smartctl", "SMART data and drive temperatures (smartmontools)"),
    ("nvme", "NVMe drive temperatures (nvme-cli)"),
    ("lsblk", "disk discovery (util-linux)"),
    ("df", "partition usage (coreutils)"),
];

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),

    #[error("Cannot read {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Required tool not found on PATH: {0}")]
    ToolMissing(&'static str),
}

/// Validate all runtime requirements, returning every problem found.
pub fn validate_requirements(
    proc_root: &Path,
    use_sudo: bool,
    runner: &dyn CommandRunner,
) -> Vec<ValidationError> {
    info!("🔍 Validating runtime requirements...");

    let mut problems = Vec::new();
    if let Err(e) = check_user_privileges(use_sudo) {
        problems.push(e);
    }
    problems.extend(check_proc_sources(proc_root));
    problems.extend(check_tools(runner));

    if problems.is_empty() {
        info!("✅ All runtime requirements validated");
    }
    problems
}

/// SMART queries need root or passwordless sudo.
pub fn check_user_privileges(use_sudo: bool) -> Result<(), ValidationError> {
    if geteuid().is_root() {
        info!("✅ Running as root (uid=0)");
        return Ok(());
    }
    if use_sudo {
        info!("ℹ️  Not running as root, SMART tools will run through sudo -n");
        return Ok(());
    }
    warn!("⚠️  Not running as root and use_sudo is off - SMART data will be unavailable");
    warn!("   Recommendation: run as root or enable use_sudo with a NOPASSWD rule for smartctl and nvme");
    Err(ValidationError::InsufficientPermissions(
        "SMART data requires root".to_string(),
    ))
}

/// Checks that every pseudo-file the host probe reads is readable.
pub fn check_proc_sources(proc_root: &Path) -> Vec<ValidationError> {
    ProcfsProbe::new(proc_root)
        .source_paths()
        .into_iter()
        .filter_map(|path| match fs::File::open(&path) {
            Ok(_) => {
                info!("✅ {} readable", path.display());
                None
            }
            Err(e) => {
                warn!("⚠️  Cannot read {}: {}", path.display(), e);
                Some(ValidationError::SourceUnreadable {
                    path,
                    reason: e.to_string(),
                })
            }
        })
        .collect()
}

/// Checks which hardware tools are installed.
pub fn check_tools(runner: &dyn CommandRunner) -> Vec<ValidationError> {
    HARDWARE_TOOLS
        .iter()
        .filter_map(|(tool, purpose)| {
            if runner.tool_available(tool) {
                info!("✅ {} found ({})", tool, purpose);
                None
            } else {
                warn!("⚠️  {} not found - {} unavailable", tool, purpose);
                Some(ValidationError::ToolMissing(tool))
            }
        })
        .collect()
}
