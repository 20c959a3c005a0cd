//! `nvtelemetry status` - discovery and current state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use nvtelemetry_control::{Controller, RecordingSink};
use nvtelemetry_core::{ComponentKind, Enablement, TelemetryService, TelemetryTask};

use super::Session;

/// Arguments for `nvtelemetry status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let sink = RecordingSink::forwarding();
        let ctl = session.controller(&sink);
        let snapshot = Snapshot::capture(&ctl, true);

        if self.json {
            let payload = StatusJson {
                snapshot: snapshot.to_json(),
                log: sink.take(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        snapshot.print_table(ctl.catalog().entries().len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Result of one discovery pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub observed_at: DateTime<Utc>,
    pub tasks: Vec<TelemetryTask>,
    pub services: Vec<TelemetryService>,
}

impl Snapshot {
    pub fn capture(ctl: &Controller<'_>, logging: bool) -> Self {
        Self {
            observed_at: Utc::now(),
            tasks: ctl.get_telemetry_tasks(logging),
            services: ctl.get_telemetry_services(logging),
        }
    }

    pub fn to_json(&self) -> SnapshotJson {
        SnapshotJson {
            observed_at: self.observed_at,
            tasks: self
                .tasks
                .iter()
                .map(|task| TaskJson {
                    state: task.enablement(),
                    task: task.clone(),
                })
                .collect(),
            services: self
                .services
                .iter()
                .map(|service| ServiceJson {
                    state: service.enablement(),
                    service: service.clone(),
                })
                .collect(),
        }
    }

    pub fn print_table(&self, catalog_entries: usize) {
        let resolved = self.tasks.len() + self.services.len();
        println!(
            "nvtelemetry v{} | {resolved} of {catalog_entries} components found",
            env!("CARGO_PKG_VERSION"),
        );

        if resolved == 0 {
            println!("No telemetry components found.");
            return;
        }

        let rows: Vec<ComponentRow> = self
            .tasks
            .iter()
            .map(|task| ComponentRow {
                kind: ComponentKind::Task.to_string(),
                name: task.name.clone(),
                state: state_label(task.enablement()),
                detail: task.path.clone(),
            })
            .chain(self.services.iter().map(|service| ComponentRow {
                kind: ComponentKind::Service.to_string(),
                name: service.service_name.clone(),
                state: state_label(service.enablement()),
                detail: format!(
                    "{}, start mode {}",
                    service.run_state, service.start_mode
                ),
            }))
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "component")]
    name: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn state_label(state: Enablement) -> String {
    match state {
        Enablement::Enabled => "ENABLED".red().bold().to_string(),
        Enablement::Disabled => "DISABLED".green().bold().to_string(),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusJson {
    #[serde(flatten)]
    snapshot: SnapshotJson,
    log: Vec<String>,
}

#[derive(Serialize)]
pub struct SnapshotJson {
    observed_at: DateTime<Utc>,
    tasks: Vec<TaskJson>,
    services: Vec<ServiceJson>,
}

#[derive(Serialize)]
struct TaskJson {
    #[serde(flatten)]
    task: TelemetryTask,
    state: Enablement,
}

#[derive(Serialize)]
struct ServiceJson {
    #[serde(flatten)]
    service: TelemetryService,
    state: Enablement,
}
