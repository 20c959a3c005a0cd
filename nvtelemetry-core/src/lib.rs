//! nvtelemetry core library - domain types, catalog, adapter traits, errors,
//! configuration.
//!
//! - [`types`] - task/service snapshots and state enums
//! - [`catalog`] - the built-in list of telemetry components
//! - [`ports`] - [`TaskDirectory`] / [`ServiceDirectory`] adapter traits
//! - [`error`] - [`OsError`], [`ConfigError`]
//! - [`config`] - optional YAML overrides

pub mod catalog;
pub mod config;
pub mod error;
pub mod paths;
pub mod ports;
pub mod types;

pub use catalog::{Catalog, CatalogEntry};
pub use config::Config;
pub use error::{ConfigError, OsError};
pub use ports::{ServiceDirectory, TaskDirectory};
pub use types::{
    ComponentKind, Enablement, RunState, StartMode, TelemetryService, TelemetryTask,
};
