//! Asynchronous file sink: one bounded queue and one worker thread per file key.
//!
//! Producers render the line themselves and hand only the `String` to the
//! queue, so a worker never touches a `Record`. A worker is the sole writer of
//! its file, which gives FIFO order per key without any file-level lock.

use super::registry::{KeyTable, expand_path};
use super::{Sink, SinkBasic};
use crate::error::{Error, IoStage};
use crate::internal;
use crate::record::Record;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Outstanding lines a queue holds before producers block.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Producer-side handle to one file's queue.
#[derive(Debug, Clone)]
struct FileAgent {
    path: PathBuf,
    sender: SyncSender<String>,
    progress: Arc<Progress>,
}

impl AsRef<Path> for FileAgent {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Owner-side handle to one worker thread.
#[derive(Debug)]
struct Worker {
    key: String,
    progress: Arc<Progress>,
    done: Receiver<()>,
    handle: JoinHandle<()>,
}

/// Line counters shared by a queue's producers and its worker.
#[derive(Debug, Default)]
struct Progress {
    accepted: AtomicUsize,
    written: AtomicUsize,
    failed: AtomicUsize,
}

impl Progress {
    /// Outcome counters are read before `accepted`, so the three fields of
    /// the snapshot always add up to the lines accepted.
    fn snapshot(&self) -> WorkerReport {
        let written = self.written.load(Ordering::Acquire);
        let failed = self.failed.load(Ordering::Acquire);
        let accepted = self.accepted.load(Ordering::Acquire);
        WorkerReport {
            written,
            failed,
            pending: accepted.saturating_sub(written + failed),
        }
    }
}

/// Counters of one queue at a point in time.
#[derive(Debug, Clone, Copy)]
struct WorkerReport {
    written: usize,
    failed: usize,
    pending: usize,
}

/// Result of [`FileQueueSink::shutdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Lines written, including those a late worker managed before the deadline.
    pub written: usize,
    /// Lines whose write failed and went to the console instead.
    pub failed: usize,
    /// Lines not yet written when a worker missed the deadline.
    pub undelivered: usize,
    /// Keys whose worker missed the deadline.
    pub timed_out: Vec<String>,
}

impl ShutdownReport {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.undelivered == 0 && self.timed_out.is_empty()
    }
}

/// Queued file writes, one worker per registered key.
#[derive(Debug)]
pub struct FileQueueSink {
    basic: SinkBasic,
    capacity: usize,
    files: KeyTable<FileAgent>,
    workers: Mutex<Vec<Worker>>,
    closed: AtomicBool,
}

impl FileQueueSink {
    #[must_use]
    pub fn new(basic: SinkBasic) -> Self {
        Self::with_capacity(basic, DEFAULT_CAPACITY)
    }

    /// A capacity of zero is raised to one; a rendezvous queue would make every
    /// producer wait for the disk.
    #[must_use]
    pub fn with_capacity(basic: SinkBasic, capacity: usize) -> Self {
        Self {
            basic,
            capacity: capacity.max(1),
            files: KeyTable::default(),
            workers: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allocates a queue and starts its worker. Existing workers are untouched.
    ///
    /// Registering the same key with the same path again is a no-op returning
    /// `Ok(false)` and starts no second worker.
    ///
    /// # Errors
    /// `DuplicateKey` if `key` already points at another path, `SinkClosed`
    /// after shutdown, `Spawn` if the thread could not start.
    pub fn register_file(&self, key: &str, path: &str) -> Result<bool, Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::SinkClosed);
        }
        self.files
            .register(key, expand_path(path), |key, path| {
                self.spawn_worker(key, path)
            })
    }

    fn spawn_worker(&self, key: &str, path: PathBuf) -> Result<FileAgent, Error> {
        let (sender, receiver) = mpsc::sync_channel(self.capacity);
        let (done_tx, done_rx) = mpsc::channel();
        let progress = Arc::new(Progress::default());

        let handle = {
            let path = path.clone();
            let progress = Arc::clone(&progress);
            let basic = self.basic.clone();
            thread::Builder::new()
                .name(format!("sinklog-{key}"))
                .spawn(move || run_worker(&path, &receiver, &progress, &basic, &done_tx))
                .map_err(Error::Spawn)?
        };

        internal::debug(
            "QUEUE",
            &format!("Started worker key={key} path={}", path.display()),
        );

        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Worker {
                key: key.to_string(),
                progress: Arc::clone(&progress),
                done: done_rx,
                handle,
            });

        Ok(FileAgent {
            path,
            sender,
            progress,
        })
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.files.keys()
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Lines accepted but not yet written, across all keys.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|w| w.progress.snapshot().pending)
            .sum()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closes every queue and waits up to `timeout` (for all workers together)
    /// for them to drain. Later `add` calls escalate `SinkClosed`.
    ///
    /// Calling it twice returns an empty report the second time.
    pub fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        self.closed.store(true, Ordering::Release);
        self.files.clear();

        let workers = {
            let mut guard = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        internal::debug("QUEUE", &format!("Shutting down {} workers", workers.len()));

        let deadline = Instant::now() + timeout;
        let mut report = ShutdownReport::default();
        for worker in workers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let finished = worker.done.recv_timeout(remaining);
            let counts = worker.progress.snapshot();
            report.written += counts.written;
            report.failed += counts.failed;
            match finished {
                Ok(()) => {
                    let _ = worker.handle.join();
                }
                Err(RecvTimeoutError::Timeout) => {
                    let key = &worker.key;
                    let left = counts.pending;
                    internal::warn("QUEUE", &format!("{key} missed deadline with {left} lines"));
                    report.undelivered += left;
                    report.timed_out.push(worker.key);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Worker thread died without reporting.
                    report.undelivered += counts.pending;
                    report.timed_out.push(worker.key);
                }
            }
        }

        internal::info(
            "QUEUE",
            &format!(
                "Shutdown: written={} failed={} undelivered={}",
                report.written, report.failed, report.undelivered
            ),
        );
        report
    }

    /// The closed flag is checked after the lookup: a lookup that races
    /// shutdown reports `SinkClosed`, never the key error caused by the
    /// cleared table.
    fn resolve_open(
        &self,
        record: &Record,
        key: Option<&str>,
    ) -> Result<(String, FileAgent), Error> {
        let resolved = self.files.resolve(record, key);
        if self.is_closed() {
            return Err(Error::SinkClosed);
        }
        resolved
    }
}

impl Sink for FileQueueSink {
    fn name(&self) -> &'static str {
        "file-queue"
    }

    fn add(&self, record: &Record, key: Option<&str>) {
        let (key, agent) = match self.resolve_open(record, key) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.basic
                    .error_output(&self.basic.best_effort_line(record), &e);
                return;
            }
        };

        let line = match self.basic.create_output_string(record) {
            Ok(line) => line,
            Err(escalation) => {
                self.basic.escalate(escalation);
                return;
            }
        };

        agent.progress.accepted.fetch_add(1, Ordering::AcqRel);
        if let Err(line) = enqueue(&key, &agent.sender, line) {
            agent.progress.accepted.fetch_sub(1, Ordering::AcqRel);
            self.basic.error_output(&line, &Error::SinkClosed);
        }
    }
}

/// Non-blocking send first; when the queue is full, block until the worker
/// frees a slot. Returns the line if the queue is gone.
fn enqueue(key: &str, sender: &SyncSender<String>, line: String) -> Result<(), String> {
    match sender.try_send(line) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(line)) => {
            internal::debug("QUEUE", &format!("Queue full for key={key}, waiting"));
            sender.send(line).map_err(|e| e.0)
        }
        Err(TrySendError::Disconnected(line)) => Err(line),
    }
}

fn run_worker(
    path: &Path,
    receiver: &Receiver<String>,
    progress: &Progress,
    basic: &SinkBasic,
    done: &Sender<()>,
) {
    for line in receiver {
        thread::yield_now();
        let counter = match append_synced(path, &line) {
            Ok(()) => &progress.written,
            Err(e) => {
                basic.error_output(&line, &e);
                &progress.failed
            }
        };
        counter.fetch_add(1, Ordering::AcqRel);
    }
    internal::debug("QUEUE", &format!("Worker for {} stopped", path.display()));
    let _ = done.send(());
}

/// Open, sync what earlier writers left in OS buffers, write through a
/// buffer, flush. The handle closes on drop.
fn append_synced(path: &Path, line: &str) -> Result<(), Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(IoStage::Open, path, e))?;
    file.sync_all()
        .map_err(|e| Error::io(IoStage::Sync, path, e))?;

    let mut writer = BufWriter::new(&file);
    writer
        .write_all(line.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(|e| Error::io(IoStage::Write, path, e))?;
    writer
        .flush()
        .map_err(|e| Error::io(IoStage::Flush, path, e))
}
