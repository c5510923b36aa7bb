//! Time-bounded storage of computed rankings.

mod file;
mod key;
mod memory;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ranking::RankingResult;

pub use file::FileCache;
pub use key::CacheKey;
pub use memory::MemoryCache;

/// Seconds a cached ranking is served without recomputation
pub const DEFAULT_TTL_SECS: i64 = 600;

/// A stored ranking together with the moment it was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub created_at: DateTime<Utc>,
    pub result: RankingResult,
}

impl CacheEntry {
    pub fn new(result: RankingResult) -> Self {
        Self::created_at(result, Utc::now())
    }

    pub fn created_at(result: RankingResult, created_at: DateTime<Utc>) -> Self {
        Self { created_at, result }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.created_at) <= ttl
    }
}

/// Key-value store for ranking results. Implementations must tolerate
/// concurrent writers; the last write wins.
pub trait ResultCache: Send + Sync {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    fn store(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{RankingMeta, WindowLabels};

    fn empty_result() -> RankingResult {
        RankingResult {
            meta: RankingMeta {
                has_trend: false,
                round_count: 0,
                points_max: 0.0,
                group_name: "Berlin".to_string(),
                from: "2018-10-27".to_string(),
                to: "2018-10-27".to_string(),
                labels: WindowLabels::default(),
                older: None,
                newer: None,
            },
            entries: Vec::new(),
        }
    }

    #[test]
    fn test_entry_freshness_boundary() {
        let created = Utc::now();
        let entry = CacheEntry::created_at(empty_result(), created);
        let ttl = Duration::seconds(DEFAULT_TTL_SECS);

        assert!(entry.is_fresh(created + Duration::seconds(600), ttl));
        assert!(!entry.is_fresh(created + Duration::seconds(601), ttl));
    }

    #[test]
    fn test_file_cache_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(temp_dir.path()).unwrap();
        let key = CacheKey::derive(
            "test",
            &crate::domain::GroupSelection::single(crate::domain::Group::new(1, "Berlin")),
            &crate::ranking::RoundWindow::single(17831),
        );

        assert!(cache.load(&key).unwrap().is_none());

        let entry = CacheEntry::new(empty_result());
        cache.store(&key, &entry).unwrap();

        assert!(cache.exists(&key));
        assert_eq!(cache.load(&key).unwrap(), Some(entry));

        let leftovers = std::fs::read_dir(cache.dir())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);

        cache.clear().unwrap();
        assert!(!cache.exists(&key));
    }

    #[test]
    fn test_corrupt_cache_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(temp_dir.path()).unwrap();
        let key = CacheKey::derive(
            "broken",
            &crate::domain::GroupSelection::single(crate::domain::Group::new(1, "Berlin")),
            &crate::ranking::RoundWindow::single(1),
        );
        std::fs::write(temp_dir.path().join(format!("{}.json", key)), "{not json").unwrap();

        assert!(cache.load(&key).is_err());
    }
}
