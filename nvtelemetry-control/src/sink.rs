//! Side channel for human-readable progress lines.

use std::sync::Mutex;

/// Receives informational lines such as `Disabled task: \NvTmMon_{…}`.
///
/// Implementations must not fail; a sink that cannot record a line drops it.
pub trait LogSink {
    fn info(&self, message: &str);
}

impl<L: LogSink + ?Sized> LogSink for &L {
    fn info(&self, message: &str) {
        (**self).info(message)
    }
}

/// Forwards every line to `tracing::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!(target: "nvtelemetry", "{message}");
    }
}

/// Keeps every line in memory, optionally forwarding to `tracing` as well.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
    forward: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and also emit through [`TracingSink`].
    pub fn forwarding() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            forward: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain recorded lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .lines
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl LogSink for RecordingSink {
    fn info(&self, message: &str) {
        if self.forward {
            TracingSink.info(message);
        }
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
