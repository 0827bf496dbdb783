//! Configuration struct definitions.

use crate::fmt::DEFAULT_TEMPLATE;
use crate::sink::DEFAULT_CAPACITY;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Settings that apply to the whole logger.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Unmatched package policy (drop, console, fail).
    pub unmatched: String,
    /// Internal diagnostics threshold (off, error, warn, info, debug, trace).
    pub diagnostics: String,
    /// Upper bound for draining file queues on shutdown.
    pub shutdown_timeout_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            unmatched: "drop".to_string(),
            diagnostics: "off".to_string(),
            shutdown_timeout_ms: 5000,
        }
    }
}

/// Console sink configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub template: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Queued file sink configuration.
///
/// The sink is only built when `enabled` is set or at least one file is listed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    pub enabled: bool,
    pub template: String,
    /// Lines buffered per file before producers block.
    pub capacity: usize,
    /// File key to path; `~` is expanded.
    pub files: BTreeMap<String, String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template: DEFAULT_TEMPLATE.to_string(),
            capacity: DEFAULT_CAPACITY,
            files: BTreeMap::new(),
        }
    }
}

/// Serialized file sink configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MutexConfig {
    pub enabled: bool,
    pub template: String,
    pub files: BTreeMap<String, String>,
}

impl Default for MutexConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            template: DEFAULT_TEMPLATE.to_string(),
            files: BTreeMap::new(),
        }
    }
}

/// One sink installed for a package.
///
/// File sinks need `path`; the file key is the package name.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RouteConfig {
    /// console, file-queue or file-mutex.
    pub sink: String,
    pub detached: bool,
    pub path: Option<String>,
}
