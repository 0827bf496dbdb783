//! Sinks turn a record into a visible side effect: a console line or a file line.
//!
//! Every sink renders through a shared [`SinkBasic`] and reports its own
//! failures by escalating to the console, so [`Sink::add`] has nothing to return.

mod basic;
mod console;
mod file_mutex;
mod file_queue;
mod registry;

pub use basic::SinkBasic;
pub use console::{Capture, ConsoleSink, ConsoleWriter};
pub use file_mutex::FileMutexSink;
pub use file_queue::{DEFAULT_CAPACITY, FileQueueSink, ShutdownReport};
pub use registry::{expand_path, longest_match};

use crate::record::Record;

/// `Send + Sync` so detached dispatch can move an `Arc<dyn Sink>` onto another thread.
pub trait Sink: Send + Sync {
    /// Short identifier used in diagnostics and `SinkNotConfigured` errors.
    fn name(&self) -> &'static str;

    /// Delivers one record. `key` selects the target file for file sinks;
    /// console ignores it. Never fails from the caller's point of view.
    fn add(&self, record: &Record, key: Option<&str>);
}
