//! Per-step results reported by the transition engine.

use serde::Serialize;

use nvtelemetry_core::{ComponentKind, OsError};

/// Which mutation a step attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    EnableTask,
    DisableTask,
    StopService,
    StartService,
    DisableStartup,
    EnableAutomaticStartup,
}

impl Step {
    pub fn kind(self) -> ComponentKind {
        match self {
            Step::EnableTask | Step::DisableTask => ComponentKind::Task,
            _ => ComponentKind::Service,
        }
    }
}

/// Coarse reason a step failed; the full message travels alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    PermissionDenied,
    Timeout,
    Other,
}

impl From<&OsError> for FailureKind {
    fn from(err: &OsError) -> Self {
        match err {
            OsError::NotFound { .. } => FailureKind::NotFound,
            OsError::PermissionDenied { .. } => FailureKind::PermissionDenied,
            OsError::Timeout { .. } => FailureKind::Timeout,
            _ => FailureKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    /// The mutation ran and succeeded.
    Changed,
    /// Already at the target; nothing was called.
    Unchanged,
    /// Planning only: the mutation would run.
    WouldChange,
    Failed { kind: FailureKind, reason: String },
}

impl StepResult {
    pub(crate) fn failed(err: &OsError) -> Self {
        StepResult::Failed {
            kind: FailureKind::from(err),
            reason: err.to_string(),
        }
    }
}

/// Outcome of one step on one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    /// Task path or service name.
    pub component: String,
    pub step: Step,
    #[serde(flatten)]
    pub result: StepResult,
}

impl TransitionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.result, StepResult::Failed { .. })
    }

    pub fn is_change(&self) -> bool {
        matches!(self.result, StepResult::Changed | StepResult::WouldChange)
    }
}

/// Counts over a batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub permission_denied: usize,
}

impl OutcomeSummary {
    pub fn of(outcomes: &[TransitionOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match &outcome.result {
                StepResult::Changed | StepResult::WouldChange => summary.changed += 1,
                StepResult::Unchanged => summary.unchanged += 1,
                StepResult::Failed { kind, .. } => {
                    summary.failed += 1;
                    if *kind == FailureKind::PermissionDenied {
                        summary.permission_denied += 1;
                    }
                }
            }
        }
        summary
    }
}
