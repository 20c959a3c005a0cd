//! Adapter traits for the OS subsystems.
//!
//! The control layer only ever talks to these traits. Production
//! implementations live in `nvtelemetry-windows`; tests use in-memory fakes.

use crate::error::OsError;
use crate::types::{RunState, StartMode, TelemetryService, TelemetryTask};

/// Task scheduler access.
pub trait TaskDirectory {
    /// First task whose name matches `pattern`, or `None`.
    fn find(&self, pattern: &str) -> Result<Option<TelemetryTask>, OsError>;

    /// Live enabled flag of the task at `path`.
    fn is_enabled(&self, path: &str) -> Result<bool, OsError>;

    fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), OsError>;
}

/// Service control manager access.
pub trait ServiceDirectory {
    /// Live snapshot of the named service.
    fn query(&self, name: &str) -> Result<TelemetryService, OsError>;

    fn start(&self, name: &str) -> Result<(), OsError>;

    fn stop(&self, name: &str) -> Result<(), OsError>;

    /// Block until the service reports `target`, or fail.
    fn wait_for_state(&self, name: &str, target: RunState) -> Result<(), OsError>;

    fn set_start_mode(&self, name: &str, mode: StartMode) -> Result<(), OsError>;
}

impl<T: TaskDirectory + ?Sized> TaskDirectory for &T {
    fn find(&self, pattern: &str) -> Result<Option<TelemetryTask>, OsError> {
        (**self).find(pattern)
    }

    fn is_enabled(&self, path: &str) -> Result<bool, OsError> {
        (**self).is_enabled(path)
    }

    fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), OsError> {
        (**self).set_enabled(path, enabled)
    }
}

impl<S: ServiceDirectory + ?Sized> ServiceDirectory for &S {
    fn query(&self, name: &str) -> Result<TelemetryService, OsError> {
        (**self).query(name)
    }

    fn start(&self, name: &str) -> Result<(), OsError> {
        (**self).start(name)
    }

    fn stop(&self, name: &str) -> Result<(), OsError> {
        (**self).stop(name)
    }

    fn wait_for_state(&self, name: &str, target: RunState) -> Result<(), OsError> {
        (**self).wait_for_state(name, target)
    }

    fn set_start_mode(&self, name: &str, mode: StartMode) -> Result<(), OsError> {
        (**self).set_start_mode(name, mode)
    }
}
