#![forbid(unsafe_code)]

//! `sinklog` - structured logging into pluggable sinks.
//!
//! - Console sink, written synchronously
//! - Queued file sink: one bounded queue and one worker thread per file key
//! - Serialized file sink: one locked append per call
//! - Per-call selectors or per-package routes decide where a record goes
//! - Logging never fails the caller; sink failures are escalated to the console
//!
//! # Example
//!
//! ```
//! use sinklog::{Logger, site};
//! use sinklog::route::{Dispatch, console};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("app.log");
//!
//! let logger = Logger::builder()
//!     .file_queue()
//!         .file("app", path.to_string_lossy())
//!         .done()
//!     .package(module_path!())
//!         .console(Dispatch::Inline)
//!         .done()
//!     .build()
//!     .unwrap();
//!
//! logger.info(site!("main"), "started");
//! logger.error_to(site!(), &vec![1, 2, 3], &[console(), sinklog::route::file_queue("app")]);
//!
//! let report = logger.shutdown();
//! assert!(report.is_clean());
//! ```

pub mod config;
pub mod error;
pub mod fmt;
pub mod internal;
pub mod level;
pub mod logger;
pub mod record;
pub mod route;
pub mod sink;

pub use config::Config;
pub use error::{Error, IoStage};
pub use fmt::{FormatTemplate, Formatter, ParsedLine};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder, Scoped};
pub use record::{Payload, Record, Site};
pub use route::{Dispatch, Dispatched, Selector, Target, UnmatchedPolicy};
pub use sink::{
    ConsoleSink, ConsoleWriter, FileMutexSink, FileQueueSink, ShutdownReport, Sink, SinkBasic,
};
