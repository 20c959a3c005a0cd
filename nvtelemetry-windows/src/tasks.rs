//! Task scheduler adapter backed by `schtasks.exe`.
//!
//! Lookups enumerate every task as CSV and glob-match the leaf name, which
//! mirrors how the scheduler's own wildcard search walks all folders. The
//! enabled flag is read from the task definition XML (`Settings/Enabled`)
//! because the CSV `Status` column is translated.

use glob::{MatchOptions, Pattern};
use quick_xml::events::Event;
use quick_xml::Reader;

use nvtelemetry_core::{types::leaf_name, OsError, TaskDirectory, TelemetryTask};

use crate::runner::{CommandOutput, CommandRunner, SystemRunner};

pub const SCHTASKS: &str = "schtasks";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// [`TaskDirectory`] over `schtasks /query` and `schtasks /change`.
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler<R = SystemRunner> {
    runner: R,
}

impl TaskScheduler<SystemRunner> {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl<R: CommandRunner> TaskScheduler<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    fn schtasks(&self, subject: &str, args: &[&str]) -> Result<String, OsError> {
        let output = self.runner.run(SCHTASKS, args)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(classify(subject, &output))
        }
    }
}

impl<R: CommandRunner> TaskDirectory for TaskScheduler<R> {
    fn find(&self, pattern: &str) -> Result<Option<TelemetryTask>, OsError> {
        let matcher = Pattern::new(pattern).map_err(|e| OsError::Parse {
            program: SCHTASKS.to_string(),
            detail: format!("invalid task pattern {pattern:?}: {e}"),
        })?;
        let listing = self.schtasks(pattern, &["/query", "/fo", "csv", "/nh"])?;

        let Some(path) = parse_task_paths(&listing)?
            .into_iter()
            .find(|path| matcher.matches_with(leaf_name(path), MATCH_OPTIONS))
        else {
            return Ok(None);
        };

        let enabled = self.is_enabled(&path)?;
        Ok(Some(TelemetryTask::new(path, enabled)))
    }

    fn is_enabled(&self, path: &str) -> Result<bool, OsError> {
        let definition = self.schtasks(path, &["/query", "/tn", path, "/xml"])?;
        parse_task_enabled(&definition)
    }

    fn set_enabled(&self, path: &str, enabled: bool) -> Result<(), OsError> {
        let flag = if enabled { "/enable" } else { "/disable" };
        self.schtasks(path, &["/change", "/tn", path, flag])
            .map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Task paths from `"TaskName","Next Run Time","Status"` rows.
///
/// Header rows (repeated once per folder on some builds) and blank lines are
/// skipped.
pub fn parse_task_paths(output: &str) -> Result<Vec<String>, OsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(output.as_bytes());

    let mut paths = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| parse_err(e.to_string()))?;
        let path = row.get(0).unwrap_or("").trim();
        if path.is_empty() || path == "TaskName" {
            continue;
        }
        paths.push(path.to_string());
    }
    Ok(paths)
}

/// `Task/Settings/Enabled` from `schtasks /query /xml`. An absent element
/// means enabled, as in the task schema.
///
/// Trigger elements carry their own `Enabled`; only the one directly under
/// `Settings` counts.
pub fn parse_task_enabled(xml: &str) -> Result<bool, OsError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut seen_task = false;
    let mut enabled = true;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if stack.is_empty() && name == "Task" {
                    seen_task = true;
                }
                stack.push(name);
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(ref e)) => {
                if matches!(stack.as_slice(), [task, settings, field]
                    if task == "Task" && settings == "Settings" && field == "Enabled")
                {
                    let value = e.unescape().map_err(|err| parse_err(err.to_string()))?;
                    enabled = !value.trim().eq_ignore_ascii_case("false");
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(parse_err(err.to_string())),
        }
    }

    if seen_task {
        Ok(enabled)
    } else {
        Err(parse_err("no Task element in task definition".to_string()))
    }
}

fn parse_err(detail: String) -> OsError {
    OsError::Parse {
        program: SCHTASKS.to_string(),
        detail,
    }
}

/// `schtasks` exits 1 for every failure, so the message decides.
fn classify(subject: &str, output: &CommandOutput) -> OsError {
    let detail = output.detail();
    let lower = detail.to_ascii_lowercase();
    if lower.contains("cannot find the file") || lower.contains("does not exist") {
        OsError::NotFound {
            name: subject.to_string(),
        }
    } else if lower.contains("access is denied") {
        OsError::PermissionDenied {
            name: subject.to_string(),
        }
    } else {
        OsError::Command {
            program: SCHTASKS.to_string(),
            code: output.code,
            detail,
        }
    }
}
