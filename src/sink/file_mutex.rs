//! Synchronous file sink: every `add` opens, writes and closes the target on
//! the calling thread, serialized per path.

use super::registry::{KeyTable, expand_path};
use super::{Sink, SinkBasic};
use crate::error::{Error, IoStage};
use crate::internal;
use crate::record::Record;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Serialized, unbuffered file writes.
#[derive(Debug)]
pub struct FileMutexSink {
    basic: SinkBasic,
    files: KeyTable<PathBuf>,
    /// Keyed by path, not by file key: two keys may alias one file.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileMutexSink {
    #[must_use]
    pub fn new(basic: SinkBasic) -> Self {
        Self {
            basic,
            files: KeyTable::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Adds `key → path`.
    ///
    /// Registering the same key with the same path again is a no-op returning
    /// `Ok(false)`.
    ///
    /// # Errors
    /// `DuplicateKey` if `key` already points at another path.
    pub fn register_file(&self, key: &str, path: &str) -> Result<bool, Error> {
        let added = self
            .files
            .register(key, expand_path(path), |_, path| Ok(path))?;
        if added {
            internal::debug("MUTEX", &format!("Registered file key={key} path={path}"));
        }
        Ok(added)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.files.keys()
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// Appends `line` and a newline in a single unbuffered write. The handle is
    /// closed when it drops at the end of the call.
    ///
    /// # Errors
    /// `Io` with stage `Open` or `Write`.
    pub fn output(&self, line: &str, path: &Path) -> Result<(), Error> {
        let lock = self.lock_for(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io(IoStage::Open, path, e))?;

        let mut content = String::with_capacity(line.len() + 1);
        content.push_str(line);
        content.push('\n');
        file.write_all(content.as_bytes())
            .map_err(|e| Error::io(IoStage::Write, path, e))
    }
}

impl Sink for FileMutexSink {
    fn name(&self) -> &'static str {
        "file-mutex"
    }

    fn add(&self, record: &Record, key: Option<&str>) {
        let (key, path) = match self.files.resolve(record, key) {
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

        internal::trace("MUTEX", &format!("Writing key={key} to {}", path.display()));
        if let Err(e) = self.output(&line, &path) {
            self.basic.error_output(&line, &e);
        }
    }
}
