//! Registry response cache
//!
//! A narrow key-value store sitting in front of the registry fetches. An
//! existing entry is returned verbatim regardless of age; there is no
//! invalidation mechanism, staleness is resolved by deleting entries.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value store for raw registry payloads
pub trait CacheStore: Send + Sync {
    /// Return the stored payload for a key, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Store a payload under a key
    fn put(&self, key: &str, payload: &str) -> std::io::Result<()>;
}

/// File-backed cache, one file per key under a directory
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn put(&self, key: &str, payload: &str) -> std::io::Result<()> {
        fs::write(self.dir.join(key), payload)
    }
}

/// In-memory cache used as a test double
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load an entry, for warmed-cache scenarios
    pub fn preload(self, key: impl Into<String>, payload: impl Into<String>) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.into(), payload.into());
        self
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, payload: &str) -> std::io::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }
}
