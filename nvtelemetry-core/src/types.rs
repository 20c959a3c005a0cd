//! Domain types for telemetry components.
//!
//! Tasks and services are value snapshots of OS objects taken at resolution
//! time. They are never refreshed in place; callers that need live state go
//! back through the adapter traits in [`crate::ports`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The two kinds of OS objects the catalog can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Task,
    Service,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Task => write!(f, "task"),
            ComponentKind::Service => write!(f, "service"),
        }
    }
}

/// Two-valued projection of a component's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enablement {
    Enabled,
    Disabled,
}

impl Enablement {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Enablement::Enabled
        } else {
            Enablement::Disabled
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Enablement::Enabled)
    }
}

impl fmt::Display for Enablement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Enablement::Enabled => write!(f, "Enabled"),
            Enablement::Disabled => write!(f, "Disabled"),
        }
    }
}

/// Run state reported by the service control manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Stopped,
    StartPending,
    StopPending,
    Running,
    ContinuePending,
    PausePending,
    Paused,
    Unknown,
}

impl RunState {
    /// Map a `SERVICE_STATUS.dwCurrentState` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => RunState::Stopped,
            2 => RunState::StartPending,
            3 => RunState::StopPending,
            4 => RunState::Running,
            5 => RunState::ContinuePending,
            6 => RunState::PausePending,
            7 => RunState::Paused,
            _ => RunState::Unknown,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Stopped => "stopped",
            RunState::StartPending => "start pending",
            RunState::StopPending => "stop pending",
            RunState::Running => "running",
            RunState::ContinuePending => "continue pending",
            RunState::PausePending => "pause pending",
            RunState::Paused => "paused",
            RunState::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// How a service behaves at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    Boot,
    System,
    Automatic,
    Manual,
    Disabled,
    Unknown,
}

impl StartMode {
    /// Map a `QUERY_SERVICE_CONFIG.dwStartType` code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => StartMode::Boot,
            1 => StartMode::System,
            2 => StartMode::Automatic,
            3 => StartMode::Manual,
            4 => StartMode::Disabled,
            _ => StartMode::Unknown,
        }
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StartMode::Boot => "boot",
            StartMode::System => "system",
            StartMode::Automatic => "automatic",
            StartMode::Manual => "manual",
            StartMode::Disabled => "disabled",
            StartMode::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A scheduled task resolved from a catalog pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryTask {
    /// Full task-scheduler path, e.g. `\NvTmMon_{B2FE1952-0186-46C3-BAEC-A80AA35AC5B8}`.
    pub path: String,
    /// Leaf name of `path`.
    pub name: String,
    pub enabled: bool,
}

impl TelemetryTask {
    pub fn new(path: impl Into<String>, enabled: bool) -> Self {
        let path = path.into();
        let name = leaf_name(&path).to_string();
        Self {
            path,
            name,
            enabled,
        }
    }

    pub fn enablement(&self) -> Enablement {
        Enablement::from_flag(self.enabled)
    }
}

/// A service resolved from a catalog name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryService {
    pub service_name: String,
    pub display_name: String,
    pub run_state: RunState,
    pub start_mode: StartMode,
}

impl TelemetryService {
    /// `Enabled` only when running with an automatic start mode.
    pub fn enablement(&self) -> Enablement {
        service_enablement(self.run_state, self.start_mode)
    }

    /// `Display Name (ServiceName)`, the form used in every log line.
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.service_name)
    }
}

/// Composite projection for services.
pub fn service_enablement(run_state: RunState, start_mode: StartMode) -> Enablement {
    Enablement::from_flag(run_state == RunState::Running && start_mode == StartMode::Automatic)
}

/// Last `\`-separated segment of a task path.
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}
