//! Read-only resolution of catalog entries.
//!
//! Absence is the common case (driver versions differ in which components
//! they install), so neither function ever fails: unresolved entries are
//! left out of the result and reported through the sink when `logging` is
//! set.

use nvtelemetry_core::{OsError, TelemetryService, TelemetryTask};

use crate::controller::Controller;

impl Controller<'_> {
    /// Resolve every task pattern, in catalog order.
    pub fn get_telemetry_tasks(&self, logging: bool) -> Vec<TelemetryTask> {
        let mut tasks = Vec::new();

        for pattern in self.catalog.task_patterns() {
            match self.tasks.find(pattern) {
                Ok(Some(task)) => {
                    if logging {
                        self.sink.info(&format!("Found Task: {}", task.name));
                        self.sink.info(&format!("Task is: {}", task.enablement()));
                    }
                    tasks.push(task);
                }
                Ok(None) => {
                    if logging {
                        self.sink.info(&format!("Failed to find task: {pattern}"));
                    }
                }
                Err(err) => {
                    tracing::debug!(pattern = %pattern, error = %err, "task lookup failed");
                    if logging {
                        self.sink.info(&lookup_failure("task", pattern, &err));
                    }
                }
            }
        }

        tasks
    }

    /// Resolve every service name, in catalog order.
    pub fn get_telemetry_services(&self, logging: bool) -> Vec<TelemetryService> {
        let mut services = Vec::new();

        for name in self.catalog.service_names() {
            match self.services.query(name) {
                Ok(service) => {
                    if logging {
                        self.sink.info(&format!("Found Service: {}", service.label()));
                        self.sink
                            .info(&format!("Service is: {}", service.enablement()));
                    }
                    services.push(service);
                }
                Err(err) => {
                    tracing::debug!(service = %name, error = %err, "service lookup failed");
                    if logging {
                        self.sink.info(&lookup_failure("service", name, &err));
                    }
                }
            }
        }

        services
    }
}

/// `Failed to find …` for plain absence; `Failed to query …` with the reason
/// for every other fault.
fn lookup_failure(kind: &str, name: &str, err: &OsError) -> String {
    if err.is_not_found() {
        format!("Failed to find {kind}: {name}")
    } else {
        format!("Failed to query {kind}: {name} ({err})")
    }
}
