use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use super::key::CacheKey;
use super::{CacheEntry, ResultCache};

/// Process-local cache, mainly for tests
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory cache lock poisoned"))?;
        entries.insert(key.clone(), entry.clone());
        Ok(())
    }
}
