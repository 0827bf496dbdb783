//! Severity labels carried by every record.

use std::fmt;
use std::str::FromStr;

/// Only affects the rendered `level=` field; routing ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Normal operational milestones.
    #[default]
    Info,
    /// Failures the application recovered from or reported upward.
    Error,
    /// Failures the application considers fatal. Logging one never unwinds.
    Panic,
}

impl Level {
    /// Uppercase because the rendered line uses `level=[INFO]`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Panic => "PANIC",
        }
    }

    /// Every level, lowest severity first.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Info, Self::Error, Self::Panic]
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `FromStr` so callers can tell an unknown label apart from other parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level: '{}'", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "error" | "err" => Ok(Self::Error),
            "panic" => Ok(Self::Panic),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
