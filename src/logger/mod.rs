//! The owned logger: sinks, file keys and package routes, built once and
//! shared by reference.

mod builder;
mod from_config;

pub use builder::{
    ConsoleBuilder, DEFAULT_SHUTDOWN_TIMEOUT, LoggerBuilder, MutexBuilder, PackageBuilder,
    QueueBuilder,
};

use crate::error::Error;
use crate::level::Level;
use crate::record::{Record, Site};
use crate::route::{Dispatched, Router, Selector};
use crate::sink::{ConsoleSink, FileMutexSink, FileQueueSink, ShutdownReport};
use serde::Serialize;
use std::time::Duration;

/// Logging entry point.
///
/// Logging calls never return errors: failures are escalated to the console
/// line by line. Dropping the logger drains the file queues within the
/// configured shutdown timeout.
#[derive(Debug)]
pub struct Logger {
    router: Router,
    shutdown_timeout: Duration,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub(crate) const fn from_parts(router: Router, shutdown_timeout: Duration) -> Self {
        Self {
            router,
            shutdown_timeout,
        }
    }

    /// Captures `value` now, then routes it: through `selectors` when given,
    /// through the package routes otherwise.
    pub fn log<T: Serialize + ?Sized>(
        &self,
        level: Level,
        site: Site,
        value: &T,
        selectors: &[Selector],
    ) -> Dispatched {
        self.record(Record::new(level, site, value), selectors)
    }

    /// Routes an already built record.
    pub fn record(&self, record: Record, selectors: &[Selector]) -> Dispatched {
        self.router.dispatch(record, selectors)
    }

    pub fn info<T: Serialize + ?Sized>(&self, site: Site, value: &T) -> Dispatched {
        self.log(Level::Info, site, value, &[])
    }

    pub fn error<T: Serialize + ?Sized>(&self, site: Site, value: &T) -> Dispatched {
        self.log(Level::Error, site, value, &[])
    }

    /// Logs at `PANIC`. Does not unwind.
    pub fn panic<T: Serialize + ?Sized>(&self, site: Site, value: &T) -> Dispatched {
        self.log(Level::Panic, site, value, &[])
    }

    pub fn info_to<T: Serialize + ?Sized>(
        &self,
        site: Site,
        value: &T,
        selectors: &[Selector],
    ) -> Dispatched {
        self.log(Level::Info, site, value, selectors)
    }

    pub fn error_to<T: Serialize + ?Sized>(
        &self,
        site: Site,
        value: &T,
        selectors: &[Selector],
    ) -> Dispatched {
        self.log(Level::Error, site, value, selectors)
    }

    pub fn panic_to<T: Serialize + ?Sized>(
        &self,
        site: Site,
        value: &T,
        selectors: &[Selector],
    ) -> Dispatched {
        self.log(Level::Panic, site, value, selectors)
    }

    /// Binds a call site so repeated calls from one place stay short.
    #[must_use]
    pub fn scoped(&self, site: Site) -> Scoped<'_> {
        Scoped { logger: self, site }
    }

    /// Adds a queued file after construction; running workers are untouched.
    ///
    /// # Errors
    /// `SinkNotConfigured` without a queued file sink, otherwise as
    /// [`FileQueueSink::register_file`].
    pub fn register_queue_file(&self, key: &str, path: &str) -> Result<bool, Error> {
        self.router
            .file_queue()
            .ok_or(Error::SinkNotConfigured("file-queue"))?
            .register_file(key, path)
    }

    /// # Errors
    /// `SinkNotConfigured` without a serialized file sink, otherwise as
    /// [`FileMutexSink::register_file`].
    pub fn register_mutex_file(&self, key: &str, path: &str) -> Result<bool, Error> {
        self.router
            .file_mutex()
            .ok_or(Error::SinkNotConfigured("file-mutex"))?
            .register_file(key, path)
    }

    /// Drains file queues within the configured timeout.
    pub fn shutdown(&self) -> ShutdownReport {
        self.shutdown_within(self.shutdown_timeout)
    }

    pub fn shutdown_within(&self, timeout: Duration) -> ShutdownReport {
        self.router
            .file_queue()
            .map(|sink| sink.shutdown(timeout))
            .unwrap_or_default()
    }

    /// Flushes the console writer.
    ///
    /// # Errors
    /// Returns the writer's I/O error.
    pub fn flush(&self) -> std::io::Result<()> {
        self.router.console().basic().console().flush()
    }

    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn console(&self) -> &ConsoleSink {
        self.router.console()
    }

    #[must_use]
    pub fn file_queue(&self) -> Option<&FileQueueSink> {
        self.router.file_queue()
    }

    #[must_use]
    pub fn file_mutex(&self) -> Option<&FileMutexSink> {
        self.router.file_mutex()
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(sink) = self.router.file_queue()
            && !sink.is_closed()
        {
            sink.shutdown(self.shutdown_timeout);
        }
    }
}

/// A logger bound to one call site.
#[derive(Debug, Clone)]
pub struct Scoped<'a> {
    logger: &'a Logger,
    site: Site,
}

impl Scoped<'_> {
    #[must_use]
    pub const fn site(&self) -> &Site {
        &self.site
    }

    pub fn info<T: Serialize + ?Sized>(&self, value: &T) -> Dispatched {
        self.logger.info(self.site.clone(), value)
    }

    pub fn error<T: Serialize + ?Sized>(&self, value: &T) -> Dispatched {
        self.logger.error(self.site.clone(), value)
    }

    pub fn panic<T: Serialize + ?Sized>(&self, value: &T) -> Dispatched {
        self.logger.panic(self.site.clone(), value)
    }

    pub fn log_to<T: Serialize + ?Sized>(
        &self,
        level: Level,
        value: &T,
        selectors: &[Selector],
    ) -> Dispatched {
        self.logger.log(level, self.site.clone(), value, selectors)
    }
}
