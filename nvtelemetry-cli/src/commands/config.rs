//! `nvtelemetry config init|show`.

use anyhow::{Context, Result};
use clap::Subcommand;

use nvtelemetry_core::{config as core_config, paths};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write ~/.nvtelemetry/config.yaml with the built-in catalog, unless it exists.
    Init,

    /// Print the effective configuration as YAML.
    Show,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => {
            let (path, created) =
                core_config::init().context("failed to write default config")?;
            if created {
                println!("✓ wrote {}", path.display());
            } else {
                println!("{} already exists, left unchanged", path.display());
            }
        }
        ConfigCommand::Show => {
            let config = core_config::load().context("failed to load config")?;
            let path = paths::config_path(&core_config::home_dir()?);
            let origin = if path.exists() {
                path.display().to_string()
            } else {
                "built-in defaults".to_string()
            };
            println!("# {origin}");
            print!(
                "{}",
                serde_yaml::to_string(&config).context("failed to serialize config")?
            );
        }
    }
    Ok(())
}
