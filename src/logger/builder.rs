//! Stepwise logger construction. Each sink kind gets a sub-builder that
//! returns to the parent through `done()`.

use super::Logger;
use crate::error::Error;
use crate::fmt::{DEFAULT_TEMPLATE, Formatter};
use crate::internal;
use crate::route::{Dispatch, PackageRoutes, Router, Selector, Target, UnmatchedPolicy};
use crate::sink::{
    ConsoleSink, ConsoleWriter, DEFAULT_CAPACITY, FileMutexSink, FileQueueSink, SinkBasic,
};
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for draining file queues.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct QueueSpec {
    template: String,
    capacity: usize,
    files: Vec<(String, String)>,
}

impl Default for QueueSpec {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            capacity: DEFAULT_CAPACITY,
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct MutexSpec {
    template: String,
    files: Vec<(String, String)>,
}

impl Default for MutexSpec {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Install {
    target: Target,
    dispatch: Dispatch,
    path: Option<String>,
}

/// Collects sinks, files and package routes; nothing is started until [`build`](Self::build).
#[derive(Debug)]
pub struct LoggerBuilder {
    console_writer: ConsoleWriter,
    console_template: String,
    queue: Option<QueueSpec>,
    mutex: Option<MutexSpec>,
    packages: Vec<(String, Vec<Install>)>,
    unmatched: UnmatchedPolicy,
    shutdown_timeout: Duration,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Console only, default template, unmatched packages dropped.
    #[must_use]
    pub fn new() -> Self {
        Self {
            console_writer: ConsoleWriter::stdout(),
            console_template: DEFAULT_TEMPLATE.to_string(),
            queue: None,
            mutex: None,
            packages: Vec::new(),
            unmatched: UnmatchedPolicy::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Where console lines and escalations go. Stdout unless replaced.
    #[must_use]
    pub fn console_writer(mut self, writer: ConsoleWriter) -> Self {
        self.console_writer = writer;
        self
    }

    #[must_use]
    pub const fn unmatched(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched = policy;
        self
    }

    #[must_use]
    pub const fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[must_use]
    pub fn console(self) -> ConsoleBuilder {
        let template = self.console_template.clone();
        ConsoleBuilder {
            parent: self,
            template,
        }
    }

    /// Enables the queued file sink.
    #[must_use]
    pub fn file_queue(mut self) -> QueueBuilder {
        let spec = self.queue.take().unwrap_or_default();
        QueueBuilder { parent: self, spec }
    }

    /// Enables the serialized file sink.
    #[must_use]
    pub fn file_mutex(mut self) -> MutexBuilder {
        let spec = self.mutex.take().unwrap_or_default();
        MutexBuilder { parent: self, spec }
    }

    /// Installs sinks for records whose package contains `name`.
    #[must_use]
    pub fn package(self, name: impl Into<String>) -> PackageBuilder {
        PackageBuilder {
            parent: self,
            name: name.into(),
            installs: Vec::new(),
        }
    }

    /// Starts one worker per queued file key and wires the package routes.
    ///
    /// A package route to a file sink that was never enabled enables it with
    /// defaults. The package name becomes the file key.
    ///
    /// # Errors
    /// `DuplicateKey` when one key is given two paths, `Spawn` when a worker
    /// thread cannot start.
    pub fn build(self) -> Result<Logger, Error> {
        internal::init();
        let writer = Arc::new(self.console_writer);
        let basic = |template: &str| SinkBasic::new(Formatter::new(template), Arc::clone(&writer));

        let console = Arc::new(ConsoleSink::new(basic(&self.console_template)));

        let wants = |target: Target| {
            self.packages
                .iter()
                .flat_map(|(_, installs)| installs)
                .any(|install| install.target == target)
        };

        let queue_spec = self
            .queue
            .clone()
            .or_else(|| wants(Target::FileQueue).then(QueueSpec::default));
        let file_queue = match queue_spec {
            Some(spec) => {
                let sink = FileQueueSink::with_capacity(basic(&spec.template), spec.capacity);
                for (key, path) in &spec.files {
                    sink.register_file(key, path)?;
                }
                Some(Arc::new(sink))
            }
            None => None,
        };

        let mutex_spec = self
            .mutex
            .clone()
            .or_else(|| wants(Target::FileMutex).then(MutexSpec::default));
        let file_mutex = match mutex_spec {
            Some(spec) => {
                let sink = FileMutexSink::new(basic(&spec.template));
                for (key, path) in &spec.files {
                    sink.register_file(key, path)?;
                }
                Some(Arc::new(sink))
            }
            None => None,
        };

        let mut routes = PackageRoutes::new();
        for (name, installs) in self.packages {
            for install in installs {
                match (install.target, install.path.as_deref()) {
                    (Target::FileQueue, Some(path)) => {
                        if let Some(sink) = &file_queue {
                            sink.register_file(&name, path)?;
                        }
                    }
                    (Target::FileMutex, Some(path)) => {
                        if let Some(sink) = &file_mutex {
                            sink.register_file(&name, path)?;
                        }
                    }
                    _ => {}
                }
                routes.push(
                    name.clone(),
                    Selector::new(install.target).dispatch(install.dispatch),
                );
            }
        }

        internal::debug(
            "LOGGER",
            &format!(
                "Built logger: queue={} mutex={} routes={} unmatched={}",
                file_queue.is_some(),
                file_mutex.is_some(),
                routes.len(),
                self.unmatched
            ),
        );

        Ok(Logger::from_parts(
            Router::new(console, file_queue, file_mutex, routes, self.unmatched),
            self.shutdown_timeout,
        ))
    }
}

/// Console sink settings.
#[derive(Debug)]
pub struct ConsoleBuilder {
    parent: LoggerBuilder,
    template: String,
}

impl ConsoleBuilder {
    /// Invalid templates fall back to the default one.
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    #[must_use]
    pub fn done(mut self) -> LoggerBuilder {
        self.parent.console_template = self.template;
        self.parent
    }
}

/// Queued file sink settings.
#[derive(Debug)]
pub struct QueueBuilder {
    parent: LoggerBuilder,
    spec: QueueSpec,
}

impl QueueBuilder {
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.spec.template = template.into();
        self
    }

    /// Lines buffered per file before producers block. Zero is raised to one.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.spec.capacity = capacity;
        self
    }

    /// Registers `key` → `path` at build time. `~` is expanded.
    #[must_use]
    pub fn file(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.spec.files.push((key.into(), path.into()));
        self
    }

    #[must_use]
    pub fn done(mut self) -> LoggerBuilder {
        self.parent.queue = Some(self.spec);
        self.parent
    }
}

/// Serialized file sink settings.
#[derive(Debug)]
pub struct MutexBuilder {
    parent: LoggerBuilder,
    spec: MutexSpec,
}

impl MutexBuilder {
    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.spec.template = template.into();
        self
    }

    #[must_use]
    pub fn file(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.spec.files.push((key.into(), path.into()));
        self
    }

    #[must_use]
    pub fn done(mut self) -> LoggerBuilder {
        self.parent.mutex = Some(self.spec);
        self.parent
    }
}

/// Sinks for one package, run in the order they are added.
#[derive(Debug)]
pub struct PackageBuilder {
    parent: LoggerBuilder,
    name: String,
    installs: Vec<Install>,
}

impl PackageBuilder {
    #[must_use]
    pub fn console(mut self, dispatch: Dispatch) -> Self {
        self.installs.push(Install {
            target: Target::Console,
            dispatch,
            path: None,
        });
        self
    }

    /// Queued writes to `path`, keyed by the package name.
    #[must_use]
    pub fn file_queue(mut self, dispatch: Dispatch, path: impl Into<String>) -> Self {
        self.installs.push(Install {
            target: Target::FileQueue,
            dispatch,
            path: Some(path.into()),
        });
        self
    }

    /// Serialized writes to `path`, keyed by the package name.
    #[must_use]
    pub fn file_mutex(mut self, dispatch: Dispatch, path: impl Into<String>) -> Self {
        self.installs.push(Install {
            target: Target::FileMutex,
            dispatch,
            path: Some(path.into()),
        });
        self
    }

    /// Installs added under the same name more than once are appended.
    #[must_use]
    pub fn done(mut self) -> LoggerBuilder {
        let existing = self
            .parent
            .packages
            .iter()
            .position(|(name, _)| *name == self.name);
        match existing {
            Some(i) => self.parent.packages[i].1.append(&mut self.installs),
            None => self.parent.packages.push((self.name, self.installs)),
        }
        self.parent
    }
}
