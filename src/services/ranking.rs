use anyhow::{Context, Result};
use log::info;

use crate::cache::FileCache;
use crate::config::AppConfig;
use crate::database;
use crate::domain::{Group, GroupId, GroupSelection};
use crate::errors::RankingError;
use crate::ranking::{RankingEngine, RankingRequest, RankingResult};
use crate::store::SqliteScoreStore;

/// Ranking engine wired to the SQLite score database and the file cache
pub struct RankingService {
    engine: RankingEngine<SqliteScoreStore, FileCache>,
}

impl RankingService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store = SqliteScoreStore::open(&config.store.database_path)?;
        let cache = FileCache::new(&config.cache.dir)?;
        info!(
            "Using score database {} and cache {}",
            config.store.database_path,
            config.cache.dir.display()
        );

        Ok(Self {
            engine: RankingEngine::new(store, cache).with_ttl(config.cache.ttl_secs),
        })
    }

    /// Looks up the groups by id, keeping the order they were given in
    pub fn resolve_groups(&self, ids: &[GroupId]) -> Result<GroupSelection> {
        let mut conn = database::get_connection(self.engine.store().pool())?;
        let groups = database::groups::find_by_ids(&mut conn, ids)
            .context("Failed to resolve group selection")?;

        Ok(GroupSelection::new(
            groups.into_iter().map(|g| Group::new(g.id, g.name)).collect(),
        ))
    }

    pub fn rank(&self, request: &RankingRequest) -> Result<RankingResult, RankingError> {
        self.engine.compute_ranking(request)
    }
}
