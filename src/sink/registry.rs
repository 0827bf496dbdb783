//! Key → file table shared by both file sinks, and the key-resolution rule.

use crate::error::Error;
use crate::record::Record;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Expands a leading `~`; nothing else is checked until the first write.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Longest candidate contained in `package`; equal lengths resolve to the
/// lexicographically smallest name.
pub fn longest_match<'a, I>(package: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|name| package.contains(*name))
        .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
}

/// Insert-only map from file key to a per-file entry.
#[derive(Debug)]
pub struct KeyTable<T> {
    entries: RwLock<BTreeMap<String, T>>,
}

impl<T> Default for KeyTable<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Clone + AsRef<Path>> KeyTable<T> {
    /// `Ok(true)` when `make` ran and the entry was added; `Ok(false)` when the
    /// key already maps to the same path.
    ///
    /// # Errors
    /// `DuplicateKey` when the key maps to a different path, or whatever `make` returns.
    pub fn register(
        &self,
        key: &str,
        path: PathBuf,
        make: impl FnOnce(&str, PathBuf) -> Result<T, Error>,
    ) -> Result<bool, Error> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(key) {
            let existing = existing.as_ref();
            if existing == path.as_path() {
                return Ok(false);
            }
            return Err(Error::DuplicateKey {
                key: key.to_string(),
                existing: existing.to_path_buf(),
            });
        }
        let entry = make(key, path)?;
        entries.insert(key.to_string(), entry);
        Ok(true)
    }

    /// Explicit key if one was supplied; otherwise, for package-routed
    /// records, the longest registered key contained in the record's package.
    ///
    /// # Errors
    /// `MissingKey` for an explicitly routed record without a key,
    /// `UnknownKey` when nothing is registered under the resolved name.
    pub fn resolve(&self, record: &Record, key: Option<&str>) -> Result<(String, T), Error> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let key = match key {
            Some(key) => key,
            None if record.is_explicit_routing() => return Err(Error::MissingKey),
            None => {
                let package = record.site().package_name();
                longest_match(package, entries.keys().map(String::as_str))
                    .ok_or_else(|| Error::UnknownKey(package.to_string()))?
            }
        };
        entries
            .get(key)
            .map(|entry| (key.to_string(), entry.clone()))
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Removes every entry; used only when the owning sink shuts down.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
