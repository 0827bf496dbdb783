//! Reads lines written with the default template back into their fields.
//!
//! Useful for tooling that greps log files and for verifying what a sink wrote.

use crate::level::Level;
use regex::Regex;
use std::sync::LazyLock;

/// `value=[...]` is matched greedily and anchored by the `];date=[` that follows,
/// so payloads containing `]` still parse.
static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^level=\[(?P<level>[A-Z]+)\];",
        r"func=\[name: (?P<func>.*?), line: (?P<line>-?\d+), package:(?P<package>.*?)\];",
        r"value=\[(?P<value>.*)\];",
        r"date=\[(?P<date>[^\]]*)\];",
        r"(?:error=\[(?P<error>.*)\];)?$",
    ))
    .expect("Invalid line regex")
});

/// Fields of one rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub level: Level,
    pub func: String,
    pub line: i64,
    pub package: String,
    pub value: String,
    pub date: String,
    /// Present on lines that went through the escalation path.
    pub error: Option<String>,
}

impl ParsedLine {
    /// `None` if the line was not rendered with the default template.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = LINE_REGEX.captures(line.trim_end_matches(['\n', '\r']))?;
        Some(Self {
            level: caps["level"].parse().ok()?,
            func: caps["func"].to_string(),
            line: caps["line"].parse().ok()?,
            package: caps["package"].to_string(),
            value: caps["value"].to_string(),
            date: caps["date"].to_string(),
            error: caps.name("error").map(|m| m.as_str().to_string()),
        })
    }
}
