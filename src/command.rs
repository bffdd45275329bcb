//! Command gateway for external tools.
//!
//! Runs a program directly (no shell), captures stdout and classifies
//! failures. There is no retry here; callers decide whether a missing tool
//! disables a feature or falls back to another source.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default budget for a single external command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Shell convention for "command not found", reported by sudo and wrappers.
const EXIT_CODE_NOT_FOUND: i32 = 127;

/// Failure classes of an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{tool} not installed")]
    ToolNotFound { tool: String },

    #[error("{program} exited with code {code}: {stderr}")]
    ExitNonZero {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{program} wrote to stderr: {stderr}")]
    StderrNonEmpty { program: String, stderr: String },

    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// A missing tool will not appear on the next tick either.
    pub fn is_permanent(&self) -> bool {
        matches!(self, CommandError::ToolNotFound { .. })
    }

    /// Worth trying again on the next scheduled tick.
    pub fn is_transient(&self) -> bool {
        !self.is_permanent()
    }
}

/// A single external command: program, arguments and acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub sudo: bool,
    pub allow_nonzero_exit: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            sudo: false,
            allow_nonzero_exit: false,
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Run through `sudo -n` (never prompts).
    pub fn sudo(mut self, enabled: bool) -> Self {
        self.sudo = enabled;
        self
    }

    /// Accept a non-zero exit status as long as stdout is not empty.
    ///
    /// smartctl encodes disk health bits in its exit status while still
    /// printing a complete report.
    pub fn allow_nonzero_exit(mut self) -> Self {
        self.allow_nonzero_exit = true;
        self
    }

    /// Program and arguments actually spawned.
    pub fn argv(&self) -> (String, Vec<String>) {
        if self.sudo {
            let mut args = vec!["-n".to_string(), self.program.clone()];
            args.extend(self.args.iter().cloned());
            ("sudo".to_string(), args)
        } else {
            (self.program.clone(), self.args.clone())
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (program, args) = self.argv();
        write!(f, "{}", program)?;
        for arg in args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured output of a finished process, before classification.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Applies the failure rules to a finished process.
///
/// - exit 127 is a missing tool (sudo and wrappers report it that way)
/// - non-zero exit fails unless allowed and stdout carries data
/// - stderr with a zero exit fails only when stdout is empty
pub fn classify_output(invocation: &Invocation, raw: RawOutput) -> Result<String, CommandError> {
    let stderr = raw.stderr.trim().to_string();
    match raw.code {
        Some(EXIT_CODE_NOT_FOUND) => Err(CommandError::ToolNotFound {
            tool: invocation.program.clone(),
        }),
        Some(0) => {
            if !stderr.is_empty() {
                if raw.stdout.trim().is_empty() {
                    return Err(CommandError::StderrNonEmpty {
                        program: invocation.program.clone(),
                        stderr,
                    });
                }
                debug!("{} stderr (ignored): {}", invocation.program, stderr);
            }
            Ok(raw.stdout)
        }
        code => {
            if invocation.allow_nonzero_exit && !raw.stdout.trim().is_empty() {
                debug!(
                    "{} exited with {:?}, accepting output",
                    invocation.program, code
                );
                return Ok(raw.stdout);
            }
            Err(CommandError::ExitNonZero {
                program: invocation.program.clone(),
                // Killed by signal reports no code.
                code: code.unwrap_or(-1),
                stderr,
            })
        }
    }
}

/// Seam between collectors and the operating system.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command and returns its stdout.
    async fn run(&self, invocation: &Invocation) -> Result<String, CommandError>;

    /// Whether the tool can be found on PATH.
    fn tool_available(&self, tool: &str) -> bool;
}

/// Runs commands as child processes with a per-command timeout.
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
        let (program, args) = invocation.argv();
        debug!("Running command: {}", invocation);

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CommandError::ToolNotFound {
                    tool: program.clone(),
                }
            } else {
                CommandError::Spawn {
                    program: program.clone(),
                    source: e,
                }
            }
        })?;

        // Dropping the future on timeout kills the child; its output is discarded.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| CommandError::Spawn {
                program: program.clone(),
                source: e,
            })?,
            Err(_) => {
                return Err(CommandError::Timeout {
                    program: invocation.program.clone(),
                    after: self.timeout,
                })
            }
        };

        classify_output(
            invocation,
            RawOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        )
    }

    fn tool_available(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}
