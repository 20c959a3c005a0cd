//! In-memory task scheduler and service manager with call counters and
//! fault injection.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use nvtelemetry_core::{
    types::leaf_name, OsError, RunState, ServiceDirectory, StartMode, TaskDirectory,
    TelemetryService, TelemetryTask,
};

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeTasks {
    tasks: RefCell<Vec<(String, bool)>>,
    failing_writes: RefCell<HashSet<String>>,
    failing_lookups: RefCell<HashSet<String>>,
    writes: RefCell<Vec<(String, bool)>>,
}

impl FakeTasks {
    pub fn with(tasks: &[(&str, bool)]) -> Self {
        let fake = Self::default();
        for (path, enabled) in tasks {
            fake.tasks.borrow_mut().push((path.to_string(), *enabled));
        }
        fake
    }

    pub fn fail_writes_to(&self, path: &str) {
        self.failing_writes.borrow_mut().insert(path.to_string());
    }

    pub fn fail_lookup_of(&self, pattern: &str) {
        self.failing_lookups.borrow_mut().insert(pattern.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.tasks.borrow_mut().retain(|(p, _)| p != path);
    }

    pub fn enabled(&self, path: &str) -> Option<bool> {
        self.tasks
            .borrow()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, enabled)| *enabled)
    }

    /// Every successful `set_enabled` call, in order.
    pub fn writes(&self) -> Vec<(String, bool)> {
        self.writes.borrow().clone()
    }
}

fn matches(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == pattern,
    }
}

impl TaskDirectory for FakeTasks {
    fn find(&self, pattern: &str) -> Result<Option<TelemetryTask>, OsError> {
        if self.failing_lookups.borrow().contains(pattern) {
            return Err(OsError::PermissionDenied {
                name: pattern.to_string(),
            });
        }
        Ok(self
            .tasks
            .borrow()
            .iter()
            .find(|(path, _)| matches(pattern, leaf_name(path)))
            .map(|(path, enabled)| TelemetryTask::new(path.clone(), *enabled)))
    }

    fn is_enabled(&self, path: &str) -> Result<bool, OsError> {
        self.enabled(path).ok_or_else(|| OsError::NotFound {
            name: path.to_string(),
        })
    }

    fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), OsError> {
        if self.failing_writes.borrow().contains(path) {
            return Err(OsError::PermissionDenied {
                name: path.to_string(),
            });
        }
        let mut tasks = self.tasks.borrow_mut();
        let entry = tasks
            .iter_mut()
            .find(|(p, _)| p == path)
            .ok_or_else(|| OsError::NotFound {
                name: path.to_string(),
            })?;
        entry.1 = enabled;
        self.writes.borrow_mut().push((path.to_string(), enabled));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FakeService {
    display_name: String,
    run_state: RunState,
    start_mode: StartMode,
}

#[derive(Default)]
pub struct FakeServices {
    services: RefCell<BTreeMap<String, FakeService>>,
    failing_queries: RefCell<HashSet<String>>,
    failing_stops: RefCell<HashSet<String>>,
    failing_mode_changes: RefCell<HashSet<String>>,
    stalled: RefCell<HashSet<String>>,
    calls: RefCell<Vec<String>>,
}

impl FakeServices {
    pub fn with(name: &str, display_name: &str, run_state: RunState, start_mode: StartMode) -> Self {
        let fake = Self::default();
        fake.add(name, display_name, run_state, start_mode);
        fake
    }

    pub fn add(&self, name: &str, display_name: &str, run_state: RunState, start_mode: StartMode) {
        self.services.borrow_mut().insert(
            name.to_string(),
            FakeService {
                display_name: display_name.to_string(),
                run_state,
                start_mode,
            },
        );
    }

    pub fn fail_queries_of(&self, name: &str) {
        self.failing_queries.borrow_mut().insert(name.to_string());
    }

    pub fn fail_stops_of(&self, name: &str) {
        self.failing_stops.borrow_mut().insert(name.to_string());
    }

    /// `stop`/`start` are accepted but the service never changes state, so
    /// the following wait times out.
    pub fn stall_on(&self, name: &str) {
        self.stalled.borrow_mut().insert(name.to_string());
    }

    pub fn fail_mode_changes_of(&self, name: &str) {
        self.failing_mode_changes.borrow_mut().insert(name.to_string());
    }

    pub fn state(&self, name: &str) -> Option<(RunState, StartMode)> {
        self.services
            .borrow()
            .get(name)
            .map(|s| (s.run_state, s.start_mode))
    }

    /// Mutating calls (`stop`, `start`, `set_start_mode`) that reached the
    /// fake, in order, including ones that failed.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn with_service<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut FakeService) -> Result<R, OsError>,
    ) -> Result<R, OsError> {
        let mut services = self.services.borrow_mut();
        let service = services.get_mut(name).ok_or_else(|| OsError::NotFound {
            name: name.to_string(),
        })?;
        f(service)
    }
}

impl ServiceDirectory for FakeServices {
    fn query(&self, name: &str) -> Result<TelemetryService, OsError> {
        if self.failing_queries.borrow().contains(name) {
            return Err(OsError::PermissionDenied {
                name: name.to_string(),
            });
        }
        self.with_service(name, |s| {
            Ok(TelemetryService {
                service_name: name.to_string(),
                display_name: s.display_name.clone(),
                run_state: s.run_state,
                start_mode: s.start_mode,
            })
        })
    }

    fn start(&self, name: &str) -> Result<(), OsError> {
        self.calls.borrow_mut().push(format!("start {name}"));
        let stalled = self.stalled.borrow().contains(name);
        self.with_service(name, |s| {
            if s.start_mode == StartMode::Disabled {
                return Err(OsError::Command {
                    program: "sc".to_string(),
                    code: Some(1058),
                    detail: "The service cannot be started because it is disabled.".to_string(),
                });
            }
            if !stalled {
                s.run_state = RunState::Running;
            }
            Ok(())
        })
    }

    fn stop(&self, name: &str) -> Result<(), OsError> {
        self.calls.borrow_mut().push(format!("stop {name}"));
        if self.failing_stops.borrow().contains(name) {
            return Err(OsError::PermissionDenied {
                name: name.to_string(),
            });
        }
        let stalled = self.stalled.borrow().contains(name);
        self.with_service(name, |s| {
            if !stalled {
                s.run_state = RunState::Stopped;
            }
            Ok(())
        })
    }

    fn wait_for_state(&self, name: &str, target: RunState) -> Result<(), OsError> {
        self.with_service(name, |s| {
            if s.run_state == target {
                Ok(())
            } else {
                Err(OsError::Timeout {
                    name: name.to_string(),
                    target,
                    waited: std::time::Duration::from_secs(30),
                })
            }
        })
    }

    fn set_start_mode(&self, name: &str, mode: StartMode) -> Result<(), OsError> {
        self.calls
            .borrow_mut()
            .push(format!("set_start_mode {name} {mode}"));
        if self.failing_mode_changes.borrow().contains(name) {
            return Err(OsError::PermissionDenied {
                name: name.to_string(),
            });
        }
        self.with_service(name, |s| {
            s.start_mode = mode;
            Ok(())
        })
    }
}

pub const MONITOR: &str = r"\NvTmMon_{B2FE1952-0186-46C3-BAEC-A80AA35AC5B8}";
pub const REPORTER: &str = r"\NvTmRep_{B2FE1952-0186-46C3-BAEC-A80AA35AC5B8}";
pub const LOGON_REPORTER: &str = r"\NvTmRepOnLogon_{B2FE1952-0186-46C3-BAEC-A80AA35AC5B8}";
pub const CONTAINER: &str = "NvTelemetryContainer";
pub const CONTAINER_DISPLAY: &str = "NVIDIA Telemetry Container";
pub const CONTAINER_LABEL: &str = "NVIDIA Telemetry Container (NvTelemetryContainer)";
pub const HELPER: &str = "NvTelemetryHelper";
pub const HELPER_DISPLAY: &str = "NVIDIA Telemetry Helper";
pub const HELPER_LABEL: &str = "NVIDIA Telemetry Helper (NvTelemetryHelper)";
