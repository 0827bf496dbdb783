//! TOML configuration: sink templates, file keys and package routes.
//!
//! ```toml
//! [general]
//! unmatched = "console"
//!
//! [queue]
//! capacity = 500
//! files = { app = "~/logs/app.log" }
//!
//! [[packages."my_crate::db"]]
//! sink = "file-queue"
//! path = "~/logs/db.log"
//! ```

mod structs;

pub use structs::{ConsoleConfig, GeneralConfig, MutexConfig, QueueConfig, RouteConfig};

use crate::internal::{self, Verbosity};
use crate::route::{Target, UnmatchedPolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `#[serde(default)]` on every section keeps an empty file valid.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub console: ConsoleConfig,
    pub queue: QueueConfig,
    pub mutex: MutexConfig,
    /// Package name to the sinks installed for it, in order.
    pub packages: BTreeMap<String, Vec<RouteConfig>>,
}

impl Config {
    /// Loads the file at [`Config::default_path`]. A missing file yields defaults.
    ///
    /// # Errors
    /// `ConfigDirNotFound` without a home directory, `ConfigIo` or
    /// `ConfigParse` for unreadable or malformed files.
    pub fn load() -> Result<Self, crate::Error> {
        let path = Self::default_path()?;
        internal::debug("CONFIG", &format!("Loading {}", path.display()));
        Self::load_from(&path)
    }

    /// # Errors
    /// `ConfigIo` if the file exists but cannot be read, `ConfigParse` on bad TOML.
    pub fn load_from(path: &Path) -> Result<Self, crate::Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        internal::info("CONFIG", &format!("Config loaded from {}", path.display()));
        Ok(config)
    }

    /// # Errors
    /// `ConfigParse` on bad TOML or mistyped fields.
    pub fn parse(content: &str) -> Result<Self, crate::Error> {
        Ok(toml::from_str(content)?)
    }

    /// `<config_dir>/sinklog/sinklog.toml`.
    ///
    /// # Errors
    /// Fails when the platform has no config directory.
    pub fn default_path() -> Result<PathBuf, crate::Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("sinklog").join("sinklog.toml"))
            .ok_or(crate::Error::ConfigDirNotFound)
    }

    /// Unknown values fall back to `Drop`.
    #[must_use]
    pub fn parse_unmatched(&self) -> UnmatchedPolicy {
        match self.general.unmatched.parse() {
            Ok(policy) => policy,
            Err(e) => {
                internal::warn("CONFIG", &e.to_string());
                UnmatchedPolicy::default()
            }
        }
    }

    /// Unknown values fall back to `Off`.
    #[must_use]
    pub fn parse_diagnostics(&self) -> Verbosity {
        self.general.diagnostics.parse().unwrap_or_default()
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.general.shutdown_timeout_ms)
    }

    /// Whether a queued file sink should be built.
    #[must_use]
    pub fn wants_queue(&self) -> bool {
        self.queue.enabled || !self.queue.files.is_empty() || self.routes_to(Target::FileQueue)
    }

    /// Whether a serialized file sink should be built.
    #[must_use]
    pub fn wants_mutex(&self) -> bool {
        self.mutex.enabled || !self.mutex.files.is_empty() || self.routes_to(Target::FileMutex)
    }

    fn routes_to(&self, target: Target) -> bool {
        self.packages
            .values()
            .flatten()
            .any(|route| matches!(route.sink.parse::<Target>(), Ok(t) if t == target))
    }
}
