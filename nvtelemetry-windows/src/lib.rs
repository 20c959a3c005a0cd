//! Windows adapters: [`TaskScheduler`] over `schtasks.exe` and
//! [`ServiceControl`] over `sc.exe`.
//!
//! Both shell out through a [`CommandRunner`]; the default [`SystemRunner`]
//! returns [`OsError::Unsupported`](nvtelemetry_core::OsError::Unsupported)
//! on every other platform.

pub mod runner;
pub mod services;
pub mod tasks;

pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use services::ServiceControl;
pub use tasks::TaskScheduler;
