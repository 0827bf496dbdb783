use super::ConsoleWriter;
use crate::error::Error;
use crate::fmt::{Escalation, Formatter};
use crate::internal;
use crate::record::Record;
use std::sync::Arc;

/// Rendering and escalation shared by every sink.
#[derive(Debug, Clone)]
pub struct SinkBasic {
    formatter: Formatter,
    console: Arc<ConsoleWriter>,
}

impl SinkBasic {
    #[must_use]
    pub const fn new(formatter: Formatter, console: Arc<ConsoleWriter>) -> Self {
        Self { formatter, console }
    }

    #[must_use]
    pub const fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    #[must_use]
    pub fn console(&self) -> &ConsoleWriter {
        &self.console
    }

    /// # Errors
    /// See [`Formatter::render`]; the error carries a placeholder line.
    pub fn create_output_string(&self, record: &Record) -> Result<String, Escalation> {
        self.formatter.render(record)
    }

    /// Best-effort line for reporting a failure that happened before rendering.
    #[must_use]
    pub fn best_effort_line(&self, record: &Record) -> String {
        match self.formatter.render(record) {
            Ok(line) => line,
            Err(escalation) => escalation.line,
        }
    }

    /// Appends `error=[...]` and writes to the console. A failing console
    /// write is swallowed.
    pub fn error_output(&self, line: &str, err: &Error) {
        internal::debug("ESCALATE", &err.to_string());
        let escalated = format!("{line}error=[{err}];");
        if let Err(e) = self.console.write_line(&escalated) {
            internal::error("ESCALATE", &format!("Console write failed: {e}"));
        }
    }

    pub fn escalate(&self, escalation: Escalation) {
        self.error_output(&escalation.line, &escalation.error);
    }
}
