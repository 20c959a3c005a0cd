//! # nvtelemetry-control
//!
//! Discovery and enable/disable transitions for the telemetry catalog.
//!
//! Build a [`Controller`] over a [`TaskDirectory`](nvtelemetry_core::TaskDirectory),
//! a [`ServiceDirectory`](nvtelemetry_core::ServiceDirectory) and a [`LogSink`],
//! resolve components with [`Controller::get_telemetry_tasks`] /
//! [`Controller::get_telemetry_services`], then hand the snapshots to the
//! `enable_*` / `disable_*` operations.

mod controller;
pub mod discovery;
pub mod outcome;
pub mod sink;
pub mod transition;

pub use controller::Controller;
pub use outcome::{FailureKind, OutcomeSummary, Step, StepResult, TransitionOutcome};
pub use sink::{LogSink, RecordingSink, TracingSink};
