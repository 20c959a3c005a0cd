//! `nvtelemetry disable` / `nvtelemetry enable`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use nvtelemetry_control::{OutcomeSummary, RecordingSink, StepResult, TransitionOutcome};
use nvtelemetry_core::Enablement;

use super::status::{Snapshot, SnapshotJson};
use super::Session;

/// Arguments shared by `disable` and `enable`.
#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Only touch scheduled tasks.
    #[arg(long, conflicts_with = "services_only")]
    pub tasks_only: bool,

    /// Only touch services.
    #[arg(long)]
    pub services_only: bool,

    /// Show what would change without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ToggleArgs {
    pub fn run(self, session: &Session, target: Enablement) -> Result<()> {
        let sink = RecordingSink::forwarding();
        let ctl = session.controller(&sink);
        let before = Snapshot::capture(&ctl, true);

        let mut outcomes = Vec::new();
        if !self.services_only {
            outcomes.extend(match (target, self.dry_run) {
                (_, true) => ctl.plan_telemetry_tasks(&before.tasks, target),
                (Enablement::Disabled, false) => ctl.disable_telemetry_tasks(&before.tasks),
                (Enablement::Enabled, false) => ctl.enable_telemetry_tasks(&before.tasks),
            });
        }
        if !self.tasks_only {
            outcomes.extend(match (target, self.dry_run) {
                (_, true) => ctl.plan_telemetry_services(&before.services, target),
                (Enablement::Disabled, false) => ctl.disable_telemetry_services(&before.services),
                (Enablement::Enabled, false) => ctl.enable_telemetry_services(&before.services),
            });
        }

        let summary = OutcomeSummary::of(&outcomes);
        let after = if self.dry_run {
            None
        } else {
            Some(Snapshot::capture(&ctl, false))
        };

        if self.json {
            let payload = ToggleJson {
                target,
                dry_run: self.dry_run,
                summary,
                outcomes,
                after: after.as_ref().map(Snapshot::to_json),
                log: sink.take(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize JSON")?
            );
            return Ok(());
        }

        print_outcomes(target, self.dry_run, &outcomes, &summary);
        if let Some(after) = after {
            after.print_table(ctl.catalog().entries().len());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ToggleJson {
    target: Enablement,
    dry_run: bool,
    summary: OutcomeSummary,
    outcomes: Vec<TransitionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<SnapshotJson>,
    log: Vec<String>,
}

fn print_outcomes(
    target: Enablement,
    dry_run: bool,
    outcomes: &[TransitionOutcome],
    summary: &OutcomeSummary,
) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let verb = match target {
        Enablement::Enabled => "enable",
        Enablement::Disabled => "disable",
    };

    if outcomes.is_empty() {
        println!("{prefix}✓ nothing to {verb}, no telemetry components found");
        return;
    }

    if dry_run {
        for outcome in outcomes.iter().filter(|o| o.is_change()) {
            println!("{prefix}would {}: {}", outcome.step.action(), outcome.component);
        }
    }
    for outcome in outcomes {
        if let StepResult::Failed { reason, .. } = &outcome.result {
            println!(
                "{} {} {}: {reason}",
                "✗".red().bold(),
                outcome.step.kind(),
                outcome.component
            );
        }
    }

    let changed_label = if dry_run { "to change" } else { "changed" };
    println!(
        "{prefix}{} {verb}: {} {changed_label}, {} unchanged, {} failed",
        if summary.failed == 0 {
            "✓".green().bold()
        } else {
            "!".yellow().bold()
        },
        summary.changed,
        summary.unchanged,
        summary.failed,
    );

    if summary.permission_denied > 0 {
        println!(
            "{}",
            "Some changes were refused. Re-run from an elevated (Administrator) prompt."
                .yellow()
        );
    }
}
