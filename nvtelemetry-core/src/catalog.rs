//! The list of OS objects that make up the telemetry subsystem.
//!
//! Task entries are wildcard patterns matched against task names because the
//! driver installer suffixes each task with a per-install GUID. Service
//! entries are exact service names.

use serde::Serialize;

use crate::types::ComponentKind;

/// Monitor sub-mechanism.
pub const TASK_MONITOR: &str = "NvTmMon_*";
/// Periodic reporter sub-mechanism.
pub const TASK_REPORTER: &str = "NvTmRep_*";
/// Reporter that fires at user logon.
pub const TASK_LOGON_REPORTER: &str = "NvTmRepOnLogon_*";

pub const DEFAULT_TASK_PATTERNS: [&str; 3] = [TASK_MONITOR, TASK_REPORTER, TASK_LOGON_REPORTER];

pub const SERVICE_TELEMETRY_CONTAINER: &str = "NvTelemetryContainer";

pub const DEFAULT_SERVICE_NAMES: [&str; 1] = [SERVICE_TELEMETRY_CONTAINER];

/// One `(kind, name-or-pattern)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub kind: ComponentKind,
    pub name: String,
}

/// Task patterns and service names to resolve, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    tasks: Vec<String>,
    services: Vec<String>,
}

impl Catalog {
    /// The built-in NVIDIA catalog.
    pub fn nvidia() -> Self {
        Self::new(DEFAULT_TASK_PATTERNS, DEFAULT_SERVICE_NAMES)
    }

    pub fn new<T, S>(tasks: T, services: S) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            tasks: tasks.into_iter().map(Into::into).collect(),
            services: services.into_iter().map(Into::into).collect(),
        }
    }

    pub fn task_patterns(&self) -> &[String] {
        &self.tasks
    }

    pub fn service_names(&self) -> &[String] {
        &self.services
    }

    /// Every entry, tasks first.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let tasks = self.tasks.iter().map(|name| CatalogEntry {
            kind: ComponentKind::Task,
            name: name.clone(),
        });
        let services = self.services.iter().map(|name| CatalogEntry {
            kind: ComponentKind::Service,
            name: name.clone(),
        });
        tasks.chain(services).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::nvidia()
    }
}
