//! Error types for metric collection.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::command::CommandError;

/// Coarse failure classes used for logging and health accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ToolNotFound,
    CommandFailed,
    ParseFailed,
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::ToolNotFound => "tool_not_found",
            ErrorKind::CommandFailed => "command_failed",
            ErrorKind::ParseFailed => "parse_failed",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Failure of a single collector step.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to parse {source_name}: {detail}")]
    Parse {
        source_name: &'static str,
        detail: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("collection step timed out")]
    Timeout,
}

impl CollectError {
    pub fn parse(source_name: &'static str, detail: impl Into<String>) -> Self {
        CollectError::Parse {
            source_name,
            detail: detail.into(),
        }
    }

    /// Maps the error onto the collection failure taxonomy.
    ///
    /// A command timeout is reported as `CommandFailed`; `Timeout` is reserved
    /// for a collection step that overran its own budget.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectError::Command(CommandError::ToolNotFound { .. }) => ErrorKind::ToolNotFound,
            CollectError::Command(_) => ErrorKind::CommandFailed,
            CollectError::Parse { .. } => ErrorKind::ParseFailed,
            CollectError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                ErrorKind::ToolNotFound
            }
            CollectError::Io { .. } => ErrorKind::CommandFailed,
            CollectError::Timeout => ErrorKind::Timeout,
        }
    }
}
