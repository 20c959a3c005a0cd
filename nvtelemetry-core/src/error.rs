//! Error types for nvtelemetry-core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::RunState;

/// Outcome of a failed call into the task scheduler or service control manager.
///
/// Adapters report these; discovery and the transition engine collapse them
/// into log lines and never hand them to their own callers.
#[derive(Debug, Error)]
pub enum OsError {
    /// The named task or service does not exist.
    #[error("{name} not found")]
    NotFound { name: String },

    /// The caller lacks the rights to query or change the object.
    #[error("access denied for {name}")]
    PermissionDenied { name: String },

    /// A wait-for-state call gave up before the target state was reported.
    #[error("timed out after {waited:?} waiting for {name} to become {target}")]
    Timeout {
        name: String,
        target: RunState,
        waited: Duration,
    },

    /// The OS tool ran but reported failure.
    #[error("{program} failed (exit code {code:?}): {detail}")]
    Command {
        program: String,
        code: Option<i32>,
        detail: String,
    },

    /// The OS tool could not be spawned.
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The OS tool's output could not be understood.
    #[error("unexpected {program} output: {detail}")]
    Parse { program: String, detail: String },

    /// The host cannot reach the subsystem at all.
    #[error("{0}")]
    Unsupported(String),
}

impl OsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, OsError::NotFound { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, OsError::PermissionDenied { .. })
    }
}

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, read-only volume, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or %USERPROFILE%")]
    HomeNotFound,

    /// A catalog override was present but empty or held a blank entry.
    #[error("invalid catalog in {path}: {reason}")]
    InvalidCatalog { path: PathBuf, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
