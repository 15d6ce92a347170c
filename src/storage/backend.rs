use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::foundation::error::{AdError, AdResult};
use crate::foundation::retry::{RetryPolicy, retry_with_backoff};

/// Flat string key/value storage.
pub trait StorageBackend: Send + Sync {
    /// `Ok(None)` when the key is absent.
    fn read(&self, key: &str) -> AdResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> AdResult<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> AdResult<()>;
}

/// In-process storage with an optional byte quota over all keys and values.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes that would push the total size past `bytes` fail with a quota error.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(bytes),
        }
    }

    fn entries(&self) -> AdResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AdError::storage("memory storage lock poisoned"))
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> AdResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> AdResult<()> {
        let mut entries = self.entries()?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(AdError::storage(format!(
                    "quota exceeded: {needed} bytes needed, {quota} allowed"
                )));
            }
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> AdResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    retry: RetryPolicy,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            retry: RetryPolicy::once(),
        }
    }

    /// Retry budget applied to writes.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> AdResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(AdError::validation(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> AdResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AdError::storage(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> AdResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        retry_with_backoff(self.retry, |_| {
            std::fs::create_dir_all(&self.dir)
                .and_then(|()| std::fs::write(&tmp, value))
                .and_then(|()| std::fs::rename(&tmp, &path))
        })
        .map_err(|e| AdError::storage(format!("write '{}': {e}", path.display())))
    }

    fn remove(&self, key: &str) -> AdResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AdError::storage(format!(
                "remove '{}': {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storage/backend.rs"]
mod tests;
