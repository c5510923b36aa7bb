use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::key::CacheKey;
use super::{CacheEntry, ResultCache};
use crate::errors::cache_context;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-based cache with one JSON document per key.
///
/// Entries are written to a temporary file and renamed into place, so a
/// reader never sees a half-written entry. Nothing is ever evicted.
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    /// Create a new cache instance
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Check if a cached entry exists, fresh or not
    pub fn exists(&self, key: &CacheKey) -> bool {
        self.build_path(key).exists()
    }

    /// Remove every cached entry
    pub fn clear(&self) -> Result<()> {
        fs::remove_dir_all(&self.cache_dir).context("Failed to clear cache")?;

        fs::create_dir_all(&self.cache_dir).context("Failed to recreate cache directory")?;

        info!("Cleared cache directory");
        Ok(())
    }

    // --- Helper Methods ---

    fn build_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    fn build_temp_path(&self, key: &CacheKey) -> PathBuf {
        let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.cache_dir
            .join(format!(".{}.{}-{}.tmp", key, std::process::id(), unique))
    }

    fn write_json_atomic(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        let json = serde_json::to_string_pretty(entry).context("Failed to serialize ranking")?;
        let temp_path = self.build_temp_path(key);
        let file_path = self.build_path(key);

        fs::write(&temp_path, json).context("Failed to write cache file")?;
        if let Err(e) = fs::rename(&temp_path, &file_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).context("Failed to move cache file into place");
        }
        Ok(())
    }

    fn read_json_opt(&self, path: &Path) -> Result<Option<CacheEntry>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let entry = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(entry))
    }
}

impl ResultCache for FileCache {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        self.read_json_opt(&self.build_path(key))
            .with_context(|| cache_context("read", key.as_str()))
    }

    fn store(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        self.write_json_atomic(key, entry)
            .with_context(|| cache_context("write", key.as_str()))?;
        info!("Saved ranking to cache: {}", self.build_path(key).display());
        Ok(())
    }
}
