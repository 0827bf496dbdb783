//! Record → line.

use super::format::{FormatTemplate, FormatValues};
use crate::error::Error;
use crate::record::{Payload, Record};

/// Placeholder value written in place of a payload that failed to serialize.
pub const MARSHAL_PLACEHOLDER: &str = "marshal error";

/// A render that failed still produces a best-effort line, so the
/// escalation path always has something to print.
#[derive(Debug)]
pub struct Escalation {
    pub line: String,
    pub error: Error,
}

/// Renders records through one template. Pure; shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    template: FormatTemplate,
}

impl Formatter {
    /// Invalid templates fall back to the default layout.
    #[must_use]
    pub fn new(template: &str) -> Self {
        Self {
            template: FormatTemplate::parse_or_default(template),
        }
    }

    #[must_use]
    pub const fn with_template(template: FormatTemplate) -> Self {
        Self { template }
    }

    /// # Errors
    /// `EmptyValue` when the record has neither payload nor date, `Marshal`
    /// when the payload failed to serialize. Both carry the placeholder line.
    pub fn render(&self, record: &Record) -> Result<String, Escalation> {
        let (value, error) = match record.payload() {
            Payload::Value(v) => (v.as_str(), None),
            Payload::Empty if record.timestamp().is_empty() => ("", Some(Error::EmptyValue)),
            Payload::Empty => ("", None),
            Payload::Invalid(msg) => (MARSHAL_PLACEHOLDER, Some(Error::Marshal(msg.clone()))),
        };

        let site = record.site();
        let values = FormatValues::new()
            .level(record.level().as_str())
            .func(site.function_name())
            .line(site.line_string())
            .package(site.package_name())
            .value(value)
            .date(record.timestamp());
        let line = self.template.render(&values);

        match error {
            None => Ok(line),
            Some(error) => Err(Escalation { line, error }),
        }
    }
}
