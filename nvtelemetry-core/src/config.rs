//! Optional YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.nvtelemetry/
//!   config.yaml        (optional - defaults apply when absent)
//!   logs/
//!     nvtelemetry.log
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)` - explicit home; used in tests with `TempDir`
//! - `fn(…)` - derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, DEFAULT_SERVICE_NAMES, DEFAULT_TASK_PATTERNS};
use crate::error::{io_err, ConfigError};
use crate::paths::{config_path, data_root};

pub const DEFAULT_SERVICE_WAIT_TIMEOUT_SECS: u64 = 30;

/// Effective configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task-name patterns; `None` means the built-in list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
    /// Service names; `None` means the built-in list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    /// Upper bound on a single start/stop wait.
    pub service_wait_timeout_secs: u64,
    /// Mirror log output to `~/.nvtelemetry/logs/nvtelemetry.log`.
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tasks: None,
            services: None,
            service_wait_timeout_secs: DEFAULT_SERVICE_WAIT_TIMEOUT_SECS,
            log_to_file: true,
        }
    }
}

impl Config {
    /// Catalog with overrides applied.
    pub fn catalog(&self) -> Catalog {
        let tasks = self
            .tasks
            .clone()
            .unwrap_or_else(|| DEFAULT_TASK_PATTERNS.iter().map(|s| s.to_string()).collect());
        let services = self
            .services
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVICE_NAMES.iter().map(|s| s.to_string()).collect());
        Catalog::new(tasks, services)
    }

    /// Config with the built-in catalog spelled out, as written by `config init`.
    pub fn with_explicit_catalog() -> Self {
        let catalog = Catalog::nvidia();
        Self {
            tasks: Some(catalog.task_patterns().to_vec()),
            services: Some(catalog.service_names().to_vec()),
            ..Self::default()
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        for (label, list) in [("tasks", &self.tasks), ("services", &self.services)] {
            let Some(list) = list else { continue };
            if list.is_empty() {
                return Err(ConfigError::InvalidCatalog {
                    path: path.to_path_buf(),
                    reason: format!("`{label}` must not be empty; remove the key to use defaults"),
                });
            }
            if list.iter().any(|entry| entry.trim().is_empty()) {
                return Err(ConfigError::InvalidCatalog {
                    path: path.to_path_buf(),
                    reason: format!("`{label}` contains a blank entry"),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load `<home>/.nvtelemetry/config.yaml`, or defaults when it does not exist.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(&contents)
        .map_err(|e| ConfigError::Parse { path: path.clone(), source: e })?;
    config.validate(&path)?;
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home_dir()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write `config` to `<home>/.nvtelemetry/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = data_root(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }
    let path = config_path(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    Ok(path)
}

/// Write the default config unless one already exists. Returns the path and
/// whether a file was created.
pub fn init_at(home: &Path) -> Result<(PathBuf, bool), ConfigError> {
    let path = config_path(home);
    if path.exists() {
        return Ok((path, false));
    }
    save_at(home, &Config::with_explicit_catalog()).map(|p| (p, true))
}

/// `init_at` convenience wrapper.
pub fn init() -> Result<(PathBuf, bool), ConfigError> {
    init_at(&home_dir()?)
}

/// The user's home directory, which holds `.nvtelemetry/`.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
