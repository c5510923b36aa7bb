use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RankingSettings {
    /// Login whose points fill in for participants who skipped a round
    pub substitute_login: String,
    /// Maximum number of points per round and group
    pub points_max: f64,
    /// Decimals kept before comparing totals for ties
    pub score_precision: i32,
    pub namespace: String,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            substitute_login: "Sleepy".to_string(),
            points_max: 200.0,
            score_precision: 2,
            namespace: "UNNAMED".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: i64,
    pub dir: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 600, // 10 minutes
            dir: PathBuf::from("cache"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub database_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: "standings.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub ranking: RankingSettings,
    pub cache: CacheSettings,
    pub store: StoreSettings,
}

impl AppConfig {
    /// Defaults, overridden by `DATABASE_PATH` and `RANKING_CACHE_DIR`
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("DATABASE_PATH") {
            self.store.database_path = path;
        }
        if let Ok(dir) = env::var("RANKING_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
    }
}
