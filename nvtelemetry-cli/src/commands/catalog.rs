//! `nvtelemetry catalog`: the task patterns and service names in effect.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use super::Session;

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "name or pattern")]
    name: String,
}

impl CatalogArgs {
    pub fn run(self, session: &Session) -> Result<()> {
        let entries = session.config.catalog().entries();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).context("failed to serialize catalog")?
            );
            return Ok(());
        }

        let rows: Vec<EntryRow> = entries
            .into_iter()
            .map(|entry| EntryRow {
                kind: entry.kind.to_string(),
                name: entry.name,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
