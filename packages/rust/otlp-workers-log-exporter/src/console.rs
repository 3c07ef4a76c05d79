//! Console echo for failed exports.
//!
//! When `errors_to_console` is enabled, every failed send is written here in
//! addition to being reported through `on_error`. Diagnostics that are not tied
//! to a failed send go through `tracing` instead.

#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Destination for console lines.
pub(crate) trait ConsoleOutput: Send + Sync + std::fmt::Debug {
    fn write_line(&self, line: &str);
}

/// Writes to stderr.
#[derive(Debug, Default)]
pub(crate) struct StderrOutput;

impl ConsoleOutput for StderrOutput {
    fn write_line(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Captures lines in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct TestOutput {
    buffer: Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl TestOutput {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.buffer.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ConsoleOutput for TestOutput {
    fn write_line(&self, line: &str) {
        self.buffer.lock().unwrap().push(line.to_string());
    }
}
