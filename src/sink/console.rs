//! Console is both a sink of its own and the last-resort target every other
//! sink escalates to.

use super::{Sink, SinkBasic};
use crate::record::Record;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Owned, line-serialized writer behind the console sink.
///
/// One `ConsoleWriter` is shared (via `Arc`) by every sink of a logger so that
/// escalation lines and regular console lines never interleave mid-line.
pub struct ConsoleWriter {
    inner: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleWriter").finish_non_exhaustive()
    }
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ConsoleWriter {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(writer)),
        }
    }

    /// In-memory writer plus a handle to read back what was written.
    #[must_use]
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        (Self::new(capture.clone()), capture)
    }

    /// Writes `line` plus a newline as one locked operation.
    ///
    /// # Errors
    /// Whatever the underlying writer reports.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        writer.write_all(buf.as_bytes())?;
        writer.flush()
    }

    /// # Errors
    /// Whatever the underlying writer reports.
    pub fn flush(&self) -> io::Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

/// Read side of [`ConsoleWriter::capture`].
#[derive(Debug, Clone, Default)]
pub struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    #[must_use]
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(ToString::to_string).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Synchronous console output.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    basic: SinkBasic,
}

impl ConsoleSink {
    #[must_use]
    pub const fn new(basic: SinkBasic) -> Self {
        Self { basic }
    }

    #[must_use]
    pub const fn basic(&self) -> &SinkBasic {
        &self.basic
    }

    /// Write failures are dropped; there is nothing below the console to report them to.
    pub fn output(&self, line: &str) {
        let _ = self.basic.console().write_line(line);
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    /// The key is ignored; the console has a single target.
    fn add(&self, record: &Record, _key: Option<&str>) {
        match self.basic.create_output_string(record) {
            Ok(line) => self.output(&line),
            Err(escalation) => self.basic.escalate(escalation),
        }
    }
}
