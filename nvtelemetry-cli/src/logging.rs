//! Tracing setup: stderr always, plus `~/.nvtelemetry/logs/nvtelemetry.log`
//! when file logging is on.
//!
//! The log file is size-rotated before each run:
//!   nvtelemetry.log → nvtelemetry.log.1 → … → nvtelemetry.log.5

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nvtelemetry_core::paths;

/// Size-triggered rotation of one log file into numbered copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRotation {
    /// Rotate once the live file reaches this many bytes.
    pub max_bytes: u64,
    /// Numbered copies kept; `0` disables rotation.
    pub keep: usize,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            keep: 5,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// A log file that cannot be opened is reported on stderr and skipped.
pub fn init(log_home: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    let file = log_home.and_then(|home| match open_log_file(home) {
        Ok(file) => Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(err) => {
            eprintln!(
                "warning: file logging disabled ({}): {err}",
                paths::log_path(home).display()
            );
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init();
}

fn open_log_file(home: &Path) -> io::Result<fs::File> {
    fs::create_dir_all(paths::logs_dir(home))?;
    let path = paths::log_path(home);
    LogRotation::default().apply(&path)?;
    fs::OpenOptions::new().create(true).append(true).open(path)
}

impl LogRotation {
    /// Move `live` to `<live>.1` when it has outgrown `max_bytes`, shifting
    /// older copies up and discarding `<live>.<keep>`. The next open creates
    /// a fresh live file.
    ///
    /// Returns whether a rotation happened. A missing live file is not an error.
    pub fn apply(&self, live: &Path) -> io::Result<bool> {
        if self.keep == 0 || !self.is_due(live)? {
            return Ok(false);
        }

        remove_if_present(&copy_path(live, self.keep))?;
        for generation in (1..self.keep).rev() {
            rename_if_present(&copy_path(live, generation), &copy_path(live, generation + 1))?;
        }
        fs::rename(live, copy_path(live, 1))?;
        Ok(true)
    }

    fn is_due(&self, live: &Path) -> io::Result<bool> {
        match fs::metadata(live) {
            Ok(meta) => Ok(meta.len() >= self.max_bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// `nvtelemetry.log`, generation 2 → `nvtelemetry.log.2`.
fn copy_path(live: &Path, generation: usize) -> PathBuf {
    let mut name = live
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| paths::LOG_FILE.into());
    name.push(format!(".{generation}"));
    live.with_file_name(name)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

fn rename_if_present(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rotation(max_bytes: u64, keep: usize) -> LogRotation {
        LogRotation { max_bytes, keep }
    }

    fn live_log(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("nvtelemetry.log");
        fs::write(&path, body).expect("write log");
        path
    }

    #[test]
    fn small_file_is_left_alone() {
        let dir = TempDir::new().expect("tempdir");
        let log = live_log(&dir, "short");
        assert!(!rotation(1024, 3).apply(&log).expect("rotate"));
        assert!(log.exists());
        assert!(!copy_path(&log, 1).exists());
    }

    #[test]
    fn oversized_file_becomes_first_copy() {
        let dir = TempDir::new().expect("tempdir");
        let log = live_log(&dir, "0123456789");
        assert!(rotation(10, 3).apply(&log).expect("rotate"));
        assert!(!log.exists(), "live file is recreated on next open");
        assert_eq!(
            fs::read_to_string(copy_path(&log, 1)).expect("read .1"),
            "0123456789"
        );
    }

    #[test]
    fn copies_are_capped_at_keep() {
        let dir = TempDir::new().expect("tempdir");
        let log = dir.path().join("nvtelemetry.log");
        for round in 1..=5 {
            fs::write(&log, format!("round-{round}")).expect("write");
            rotation(1, 3).apply(&log).expect("rotate");
        }
        assert_eq!(
            fs::read_to_string(copy_path(&log, 1)).expect("read .1"),
            "round-5"
        );
        assert_eq!(
            fs::read_to_string(copy_path(&log, 3)).expect("read .3"),
            "round-3"
        );
        assert!(!copy_path(&log, 4).exists());
    }

    #[test]
    fn keep_zero_never_rotates() {
        let dir = TempDir::new().expect("tempdir");
        let log = live_log(&dir, "0123456789");
        assert!(!rotation(1, 0).apply(&log).expect("rotate"));
        assert!(log.exists());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let log = dir.path().join("absent.log");
        assert!(!rotation(1, 3).apply(&log).expect("rotate"));
    }

    #[test]
    fn copy_names_append_generation() {
        let log = Path::new("/tmp/logs/nvtelemetry.log");
        assert_eq!(
            copy_path(log, 2),
            PathBuf::from("/tmp/logs/nvtelemetry.log.2")
        );
    }

    #[test]
    fn open_creates_logs_dir() {
        let home = TempDir::new().expect("tempdir");
        open_log_file(home.path()).expect("open");
        assert!(paths::log_path(home.path()).exists());
    }
}
