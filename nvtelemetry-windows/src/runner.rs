//! Process execution for the Windows command-line tools.

use std::process::Command;

use nvtelemetry_core::OsError;

/// Captured result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Trimmed stdout and stderr joined, for error messages.
    pub fn detail(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (false, false) => format!("{stdout} {stderr}"),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (true, true) => String::from("no output"),
        }
    }
}

/// Runs a program to completion and captures its output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, OsError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, OsError> {
        (**self).run(program, args)
    }
}

/// Spawns real processes. Refuses to run anywhere but Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, OsError> {
        ensure_windows()?;

        tracing::debug!(program, ?args, "running");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| OsError::Io {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: decode_stream(&output.stdout),
            stderr: decode_stream(&output.stderr),
        })
    }
}

/// Console tools write either the OEM/UTF-8 code page or, for some outputs
/// such as `schtasks /xml`, UTF-16LE with a byte order mark.
pub fn decode_stream(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(windows)]
fn ensure_windows() -> Result<(), OsError> {
    Ok(())
}

#[cfg(not(windows))]
fn ensure_windows() -> Result<(), OsError> {
    Err(OsError::Unsupported(
        "service and scheduled task control is only supported on Windows".to_string(),
    ))
}
