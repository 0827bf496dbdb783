//! sinklog's own diagnostic log: worker lifecycle, backpressure, shutdown.
//!
//! Written to stderr so it never mixes with the console sink's stdout. Uses
//! `OnceLock` so the verbosity is fixed by whichever entry point (builder,
//! config, tests) initializes first; before that, every call is a no-op.

use crate::config::Config;
use chrono::Local;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::OnceLock;

/// Environment override read by [`init`].
pub const ENV_VAR: &str = "SINKLOG_DIAGNOSTICS";

static VERBOSITY: OnceLock<Verbosity> = OnceLock::new();

/// Diagnostic threshold. Ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "none" | "" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown diagnostics level: '{other}'")),
        }
    }
}

/// Fallback initializer: reads [`ENV_VAR`], defaulting to off.
pub fn init() {
    VERBOSITY.get_or_init(|| {
        std::env::var(ENV_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    });
}

/// Preferred initializer when a config has been loaded.
pub fn init_with_config(config: &Config) {
    let was_init = VERBOSITY.get().is_some();
    VERBOSITY.get_or_init(|| config.parse_diagnostics());
    if !was_init {
        debug(
            "INTERNAL",
            &format!("Diagnostics enabled at {}", verbosity()),
        );
    }
}

/// Current threshold; `Off` until initialized.
#[must_use]
pub fn verbosity() -> Verbosity {
    VERBOSITY.get().copied().unwrap_or_default()
}

fn log(level: Verbosity, scope: &str, msg: &str) {
    if level > verbosity() {
        return;
    }
    let ts = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let _ = writeln!(
        io::stderr(),
        "{ts} [sinklog] {:<5} {scope:<8} {msg}",
        level.as_str()
    );
}

pub fn trace(scope: &str, msg: &str) {
    log(Verbosity::Trace, scope, msg);
}

pub fn debug(scope: &str, msg: &str) {
    log(Verbosity::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Verbosity::Info, scope, msg);
}

pub fn warn(scope: &str, msg: &str) {
    log(Verbosity::Warn, scope, msg);
}

pub fn error(scope: &str, msg: &str) {
    log(Verbosity::Error, scope, msg);
}
