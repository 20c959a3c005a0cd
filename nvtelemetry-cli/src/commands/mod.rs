pub mod catalog;
pub mod config;
pub mod status;
pub mod toggle;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use nvtelemetry_control::{Controller, LogSink};
use nvtelemetry_core::{config as core_config, Config};
use nvtelemetry_windows::{ServiceControl, TaskScheduler};

use crate::GlobalArgs;

/// Effective configuration plus the production adapters.
pub struct Session {
    home: PathBuf,
    pub config: Config,
    tasks: TaskScheduler,
    services: ServiceControl,
}

impl Session {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let home = core_config::home_dir()?;
        let mut config = core_config::load_at(&home)
            .context("failed to load config; fix or remove ~/.nvtelemetry/config.yaml")?;

        if let Some(secs) = global.timeout {
            config.service_wait_timeout_secs = secs;
        }
        if global.no_log_file {
            config.log_to_file = false;
        }

        let services = ServiceControl::new()
            .timeout(Duration::from_secs(config.service_wait_timeout_secs));

        Ok(Self {
            home,
            config,
            tasks: TaskScheduler::new(),
            services,
        })
    }

    /// Home directory for the log file, when file logging is on.
    pub fn log_home(&self) -> Option<&Path> {
        self.config.log_to_file.then_some(self.home.as_path())
    }

    pub fn controller<'a>(&'a self, sink: &'a dyn LogSink) -> Controller<'a> {
        Controller::new(&self.tasks, &self.services, sink).with_catalog(self.config.catalog())
    }
}
