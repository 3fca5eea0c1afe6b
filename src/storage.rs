//! # Local Persistent Key-Value Storage
//!
//! A tiny string key-value store standing in for browser local storage. The
//! client keeps exactly one entry in it (the serialized house-profile list),
//! read at startup and rewritten on every change.
//!
//! - [`FileStore`]: one `<key>.json` file per key inside a data directory.
//!   Writes go to a temporary file in the same directory and are renamed into
//!   place, so a crash never leaves a half-written entry.
//! - [`MemoryStore`]: process-local map, for tests and dry runs.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StagingError, StagingResult};

/// Abstract string key-value store.
pub trait KeyValueStore {
    /// Read the value for `key`, `None` when absent.
    fn get(&self, key: &str) -> StagingResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StagingResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StagingResult<()>;
}

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> StagingResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StagingError::io("create data directory", e).with_path(dir.display().to_string())
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StagingResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StagingError::storage(key, "keys may only contain [A-Za-z0-9_-]"));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StagingResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StagingError::io("read storage entry", e)
                .with_path(path.display().to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StagingResult<()> {
        let path = self.path_for(key)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| StagingError::io("create temp file", e))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| StagingError::io("write storage entry", e))?;
        tmp.persist(&path).map_err(|e| {
            StagingError::io("persist storage entry", e.error).with_path(path.display().to_string())
        })?;
        debug!(key, bytes = value.len(), "storage entry written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StagingResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "storage entry removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StagingError::io("remove storage entry", e)
                .with_path(path.display().to_string())),
        }
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StagingResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StagingResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StagingResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
