//! Service control manager adapter backed by `sc.exe`.
//!
//! State and start type are read from the numeric codes `sc` prints next to
//! their symbolic names, so parsing does not depend on the display language.
//! Failures are classified by `sc`'s exit code, which is the Win32 error.

use std::thread;
use std::time::{Duration, Instant};

use nvtelemetry_core::{OsError, RunState, ServiceDirectory, StartMode, TelemetryService};

use crate::runner::{CommandOutput, CommandRunner, SystemRunner};

pub const SC: &str = "sc";

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const ERROR_ACCESS_DENIED: i32 = 5;
const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;

/// [`ServiceDirectory`] over `sc query` / `sc qc` / `sc start|stop|config`.
#[derive(Debug, Clone)]
pub struct ServiceControl<R = SystemRunner> {
    runner: R,
    timeout: Duration,
    poll_interval: Duration,
}

impl ServiceControl<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for ServiceControl<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> ServiceControl<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Upper bound for [`ServiceDirectory::wait_for_state`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn sc(&self, name: &str, args: &[&str]) -> Result<String, OsError> {
        let output = self.runner.run(SC, args)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(classify(name, &output))
        }
    }

    fn run_state(&self, name: &str) -> Result<RunState, OsError> {
        parse_run_state(&self.sc(name, &["query", name])?)
    }
}

impl<R: CommandRunner> ServiceDirectory for ServiceControl<R> {
    fn query(&self, name: &str) -> Result<TelemetryService, OsError> {
        let config = parse_config(&self.sc(name, &["qc", name])?)?;
        let run_state = self.run_state(name)?;
        Ok(TelemetryService {
            service_name: name.to_string(),
            display_name: config.display_name.unwrap_or_else(|| name.to_string()),
            run_state,
            start_mode: config.start_mode,
        })
    }

    fn start(&self, name: &str) -> Result<(), OsError> {
        self.sc(name, &["start", name]).map(|_| ())
    }

    fn stop(&self, name: &str) -> Result<(), OsError> {
        self.sc(name, &["stop", name]).map(|_| ())
    }

    fn wait_for_state(&self, name: &str, target: RunState) -> Result<(), OsError> {
        let started = Instant::now();
        loop {
            let state = self.run_state(name)?;
            if state == target {
                return Ok(());
            }
            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(OsError::Timeout {
                    name: name.to_string(),
                    target,
                    waited,
                });
            }
            tracing::trace!(service = %name, %state, %target, "waiting for service state");
            thread::sleep(self.poll_interval);
        }
    }

    fn set_start_mode(&self, name: &str, mode: StartMode) -> Result<(), OsError> {
        let value = start_type_arg(mode)?;
        // `sc` expects `start=` and its value as separate arguments.
        self.sc(name, &["config", name, "start=", value]).map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Fields of interest from `sc qc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub display_name: Option<String>,
    pub start_mode: StartMode,
}

/// `STATE : 4  RUNNING` → [`RunState::Running`].
pub fn parse_run_state(output: &str) -> Result<RunState, OsError> {
    field(output, "STATE")
        .and_then(leading_code)
        .map(RunState::from_code)
        .ok_or_else(|| parse_err("no STATE line in `sc query` output"))
}

/// `START_TYPE : 2   AUTO_START` and `DISPLAY_NAME : …`.
pub fn parse_config(output: &str) -> Result<ServiceConfig, OsError> {
    let start_mode = field(output, "START_TYPE")
        .and_then(leading_code)
        .map(StartMode::from_code)
        .ok_or_else(|| parse_err("no START_TYPE line in `sc qc` output"))?;
    let display_name = field(output, "DISPLAY_NAME")
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Ok(ServiceConfig {
        display_name,
        start_mode,
    })
}

/// Value after the first `:` on the line whose key is `key`.
fn field<'a>(output: &'a str, key: &str) -> Option<&'a str> {
    output.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn leading_code(value: &str) -> Option<u32> {
    value.split_whitespace().next()?.parse().ok()
}

fn start_type_arg(mode: StartMode) -> Result<&'static str, OsError> {
    match mode {
        StartMode::Boot => Ok("boot"),
        StartMode::System => Ok("system"),
        StartMode::Automatic => Ok("auto"),
        StartMode::Manual => Ok("demand"),
        StartMode::Disabled => Ok("disabled"),
        StartMode::Unknown => Err(OsError::Unsupported(
            "cannot set an unknown start mode".to_string(),
        )),
    }
}

/// Map a failed `sc` run to an [`OsError`].
///
/// `sc` exits with the Win32 error code; older builds exit 1 and only print
/// `FAILED <code>`, so that is checked as a fallback.
fn classify(name: &str, output: &CommandOutput) -> OsError {
    let code = output
        .code
        .filter(|c| *c > 1)
        .or_else(|| failed_code(&output.stdout))
        .or_else(|| failed_code(&output.stderr));

    match code {
        Some(ERROR_SERVICE_DOES_NOT_EXIST) => OsError::NotFound {
            name: name.to_string(),
        },
        Some(ERROR_ACCESS_DENIED) => OsError::PermissionDenied {
            name: name.to_string(),
        },
        _ => OsError::Command {
            program: SC.to_string(),
            code: code.or(output.code),
            detail: output.detail(),
        },
    }
}

/// `[SC] OpenService FAILED 1060:` → `1060`.
fn failed_code(text: &str) -> Option<i32> {
    let (_, rest) = text.split_once("FAILED")?;
    rest.trim_start()
        .split(|c: char| !c.is_ascii_digit())
        .next()?
        .parse()
        .ok()
}

fn parse_err(detail: &str) -> OsError {
    OsError::Parse {
        program: SC.to_string(),
        detail: detail.to_string(),
    }
}
