//! Unified error type for all sinklog operations.
//!
//! Logging calls never return these to the caller; sinks render them into the
//! `error=[...]` suffix of an escalated console line instead. Builder and config
//! operations do return them.

use std::fmt;
use std::path::PathBuf;

/// The step of a file write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    Open,
    Sync,
    Write,
    Flush,
}

impl IoStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Sync => "sync",
            Self::Write => "write",
            Self::Flush => "flush",
        }
    }
}

impl fmt::Display for IoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for sinklog operations.
#[derive(Debug)]
pub enum Error {
    /// Record has neither a payload nor a timestamp.
    EmptyValue,
    /// Payload could not be serialized.
    Marshal(String),
    /// Requested file key is not registered with the sink.
    UnknownKey(String),
    /// Explicit routing to a file sink without naming a key.
    MissingKey,
    /// File I/O failed at the given stage.
    Io {
        stage: IoStage,
        path: PathBuf,
        source: std::io::Error,
    },
    /// A selector targeted a sink the logger was built without.
    SinkNotConfigured(&'static str),
    /// The sink has been shut down and accepts no more records.
    SinkClosed,
    /// No package route matched and the policy asks to report it.
    Unrouted(String),
    /// A worker thread could not be started.
    Spawn(std::io::Error),
    /// The key is already registered with a different path.
    DuplicateKey { key: String, existing: PathBuf },
    /// Plain I/O error outside a file sink (config reading).
    ConfigIo(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Config names a selector kind that does not exist.
    InvalidSelector(String),
    /// Config names an unmatched-package policy that does not exist.
    InvalidPolicy(String),
}

impl Error {
    /// Wraps an I/O failure with the stage and file it happened on.
    #[must_use]
    pub fn io(stage: IoStage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            stage,
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "empty value: record has no payload and no date"),
            Self::Marshal(e) => write!(f, "marshal error: {e}"),
            Self::UnknownKey(key) => write!(f, "unknown file key: '{key}'"),
            Self::MissingKey => write!(f, "missing file key"),
            Self::Io {
                stage,
                path,
                source,
            } => write!(f, "{stage} error on {}: {source}", path.display()),
            Self::SinkNotConfigured(sink) => write!(f, "sink not configured: {sink}"),
            Self::SinkClosed => write!(f, "sink is shut down"),
            Self::Spawn(e) => write!(f, "failed to start worker: {e}"),
            Self::Unrouted(package) => write!(f, "no route for package: '{package}'"),
            Self::DuplicateKey { key, existing } => {
                let existing = existing.display();
                write!(f, "file key '{key}' already registered to {existing}")
            }
            Self::ConfigIo(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::InvalidSelector(kind) => write!(f, "invalid selector kind: '{kind}'"),
            Self::InvalidPolicy(policy) => write!(f, "unknown unmatched policy: '{policy}'"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::ConfigIo(e) | Self::Spawn(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::ConfigIo(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
