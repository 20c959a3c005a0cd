//! nvtelemetry - inspect and toggle NVIDIA telemetry tasks and services.
//!
//! # Usage
//!
//! ```text
//! nvtelemetry status [--json]
//! nvtelemetry disable [--tasks-only|--services-only] [--dry-run] [--json]
//! nvtelemetry enable  [--tasks-only|--services-only] [--dry-run] [--json]
//! nvtelemetry catalog [--json]
//! nvtelemetry config init|show
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{
    catalog::CatalogArgs, config::ConfigCommand, status::StatusArgs, toggle::ToggleArgs, Session,
};
use nvtelemetry_core::Enablement;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "nvtelemetry",
    version,
    about = "Inspect, disable, and re-enable NVIDIA telemetry tasks and services",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand; they override `~/.nvtelemetry/config.yaml`.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Seconds to wait for a service to reach Running/Stopped.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not write ~/.nvtelemetry/logs/nvtelemetry.log.
    #[arg(long, global = true)]
    pub no_log_file: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which telemetry tasks and services exist and their state.
    Status(StatusArgs),

    /// Stop and disable telemetry services, and disable telemetry tasks.
    Disable(ToggleArgs),

    /// Re-enable telemetry tasks and set services to start automatically.
    Enable(ToggleArgs),

    /// Print the task patterns and service names that are targeted.
    Catalog(CatalogArgs),

    /// Manage ~/.nvtelemetry/config.yaml.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let session = || -> Result<Session> {
        let session = Session::load(&cli.global)?;
        logging::init(session.log_home());
        tracing::debug!(config = ?session.config, "loaded configuration");
        Ok(session)
    };

    match cli.command {
        Commands::Status(args) => args.run(&session()?),
        Commands::Disable(args) => args.run(&session()?, Enablement::Disabled),
        Commands::Enable(args) => args.run(&session()?, Enablement::Enabled),
        Commands::Catalog(args) => args.run(&session()?),
        Commands::Config { command } => {
            logging::init(None);
            commands::config::run(command)
        }
    }
}
