//! Template parsing, record rendering, and reading rendered lines back.

mod format;
mod parse;
mod render;

pub use format::{
    DEFAULT_TEMPLATE, FormatSegment, FormatTemplate, FormatValues, Placeholder, TemplateError,
};
pub use parse::ParsedLine;
pub use render::{Escalation, Formatter, MARSHAL_PLACEHOLDER};
