//! Enable / disable transitions.
//!
//! Every step re-reads live state before deciding to mutate, so snapshots
//! from an earlier discovery pass may be reused freely. Items are processed
//! strictly in order and a fault on one step is logged and recorded without
//! touching the remaining steps or items. Nothing is rolled back.

use nvtelemetry_core::{Enablement, OsError, RunState, StartMode, TelemetryService, TelemetryTask};

use crate::controller::Controller;
use crate::outcome::{Step, StepResult, TransitionOutcome};

impl Step {
    fn success_message(self, subject: &str) -> String {
        let verb = match self {
            Step::EnableTask => "Enabled task",
            Step::DisableTask => "Disabled task",
            Step::StopService => "Disabled service",
            Step::StartService => "Enabled service",
            Step::DisableStartup => "Disabled service startup",
            Step::EnableAutomaticStartup => "Enabled automatic service startup",
        };
        format!("{verb}: {subject}")
    }

    fn failure_message(self, subject: &str) -> String {
        let verb = match self {
            Step::EnableTask => "Failed to enable task",
            Step::DisableTask => "Failed to disable task",
            Step::StopService => "Failed to disable service",
            Step::StartService => "Failed to start service",
            Step::DisableStartup => "Failed to disable service startup",
            Step::EnableAutomaticStartup => "Failed to enable automatic service startup",
        };
        format!("{verb}: {subject}")
    }

    /// Lowercase description of the mutation, e.g. `stop service`.
    pub fn action(self) -> &'static str {
        match self {
            Step::EnableTask => "enable task",
            Step::DisableTask => "disable task",
            Step::StopService => "stop service",
            Step::StartService => "start service",
            Step::DisableStartup => "set start mode to disabled",
            Step::EnableAutomaticStartup => "set start mode to automatic",
        }
    }
}

impl Controller<'_> {
    // -----------------------------------------------------------------------
    // Services
    // -----------------------------------------------------------------------

    /// Stop each running service, then set its start mode to Disabled.
    pub fn disable_telemetry_services(
        &self,
        services: &[TelemetryService],
    ) -> Vec<TransitionOutcome> {
        self.transition_services(services, Enablement::Disabled, false)
    }

    /// Set each service's start mode to Automatic, then start it.
    ///
    /// The start is attempted even when the start-mode change failed; it then
    /// fails and is logged on its own.
    pub fn enable_telemetry_services(
        &self,
        services: &[TelemetryService],
    ) -> Vec<TransitionOutcome> {
        self.transition_services(services, Enablement::Enabled, false)
    }

    /// Steps `enable`/`disable` would take, without mutating anything.
    pub fn plan_telemetry_services(
        &self,
        services: &[TelemetryService],
        target: Enablement,
    ) -> Vec<TransitionOutcome> {
        self.transition_services(services, target, true)
    }

    fn transition_services(
        &self,
        services: &[TelemetryService],
        target: Enablement,
        dry_run: bool,
    ) -> Vec<TransitionOutcome> {
        let mut outcomes = Vec::with_capacity(services.len() * 2);

        for service in services {
            let name = service.service_name.as_str();
            let label = service.label();

            match target {
                Enablement::Disabled => {
                    let stopped = self.ensure_stopped(name, dry_run);
                    outcomes.push(self.report(Step::StopService, name, &label, stopped));

                    let mode = self.ensure_start_mode(name, StartMode::Disabled, dry_run);
                    outcomes.push(self.report(Step::DisableStartup, name, &label, mode));
                }
                Enablement::Enabled => {
                    let mode = self.ensure_start_mode(name, StartMode::Automatic, dry_run);
                    outcomes.push(self.report(Step::EnableAutomaticStartup, name, &label, mode));

                    let running = self.ensure_running(name, dry_run);
                    outcomes.push(self.report(Step::StartService, name, &label, running));
                }
            }
        }

        outcomes
    }

    fn ensure_stopped(&self, name: &str, dry_run: bool) -> Result<StepResult, OsError> {
        if self.services.query(name)?.run_state != RunState::Running {
            return Ok(StepResult::Unchanged);
        }
        if dry_run {
            return Ok(StepResult::WouldChange);
        }
        self.services.stop(name)?;
        self.services.wait_for_state(name, RunState::Stopped)?;
        Ok(StepResult::Changed)
    }

    fn ensure_running(&self, name: &str, dry_run: bool) -> Result<StepResult, OsError> {
        if self.services.query(name)?.run_state == RunState::Running {
            return Ok(StepResult::Unchanged);
        }
        if dry_run {
            return Ok(StepResult::WouldChange);
        }
        self.services.start(name)?;
        self.services.wait_for_state(name, RunState::Running)?;
        Ok(StepResult::Changed)
    }

    fn ensure_start_mode(
        &self,
        name: &str,
        target: StartMode,
        dry_run: bool,
    ) -> Result<StepResult, OsError> {
        if self.services.query(name)?.start_mode == target {
            return Ok(StepResult::Unchanged);
        }
        if dry_run {
            return Ok(StepResult::WouldChange);
        }
        self.services.set_start_mode(name, target)?;
        Ok(StepResult::Changed)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Clear the enabled flag of each task that has it set.
    ///
    /// Accepts `&[TelemetryTask]` as well as lists of `Option<&TelemetryTask>`;
    /// `None` entries are skipped.
    pub fn disable_telemetry_tasks<'t, I, T>(&self, tasks: I) -> Vec<TransitionOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'t TelemetryTask>>,
    {
        self.transition_tasks(tasks, Enablement::Disabled, false)
    }

    /// Set the enabled flag of each task that has it cleared. `None` entries
    /// (unresolved lookups) are skipped silently.
    pub fn enable_telemetry_tasks<'t, I, T>(&self, tasks: I) -> Vec<TransitionOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'t TelemetryTask>>,
    {
        self.transition_tasks(tasks, Enablement::Enabled, false)
    }

    /// Steps `enable`/`disable` would take, without mutating anything.
    pub fn plan_telemetry_tasks<'t, I, T>(
        &self,
        tasks: I,
        target: Enablement,
    ) -> Vec<TransitionOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'t TelemetryTask>>,
    {
        self.transition_tasks(tasks, target, true)
    }

    fn transition_tasks<'t, I, T>(
        &self,
        tasks: I,
        target: Enablement,
        dry_run: bool,
    ) -> Vec<TransitionOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'t TelemetryTask>>,
    {
        let step = match target {
            Enablement::Enabled => Step::EnableTask,
            Enablement::Disabled => Step::DisableTask,
        };

        tasks
            .into_iter()
            .filter_map(|entry| -> Option<&'t TelemetryTask> { entry.into() })
            .map(|task| {
                let attempt = self.ensure_task(&task.path, target.is_enabled(), dry_run);
                self.report(step, &task.path, &task.path, attempt)
            })
            .collect()
    }

    fn ensure_task(&self, path: &str, enabled: bool, dry_run: bool) -> Result<StepResult, OsError> {
        if self.tasks.is_enabled(path)? == enabled {
            return Ok(StepResult::Unchanged);
        }
        if dry_run {
            return Ok(StepResult::WouldChange);
        }
        self.tasks.set_enabled(path, enabled)?;
        Ok(StepResult::Changed)
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    /// Collapse one step's result into a sink line and an outcome.
    fn report(
        &self,
        step: Step,
        component: &str,
        subject: &str,
        attempt: Result<StepResult, OsError>,
    ) -> TransitionOutcome {
        let result = match attempt {
            Ok(StepResult::Changed) => {
                self.sink.info(&step.success_message(subject));
                StepResult::Changed
            }
            Ok(StepResult::WouldChange) => {
                tracing::info!("[dry-run] would {}: {subject}", step.action());
                StepResult::WouldChange
            }
            Ok(other) => other,
            Err(err) => {
                tracing::debug!(component = %component, step = ?step, error = %err, "transition step failed");
                self.sink.info(&step.failure_message(subject));
                StepResult::failed(&err)
            }
        };

        TransitionOutcome {
            component: component.to_string(),
            step,
            result,
        }
    }
}
