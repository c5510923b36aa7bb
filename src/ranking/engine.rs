use chrono::{Duration, Utc};
use log::{debug, info, warn};

use super::aggregate::aggregate;
use super::builder::{ResultContext, build_result, count_eligible_rounds};
use super::loader::load_scores;
use super::types::{RankingResult, WindowLabels};
use super::window::{ResolvedWindow, RoundWindow, resolve_window};
use crate::cache::{CacheEntry, CacheKey, DEFAULT_TTL_SECS, ResultCache};
use crate::config::AppConfig;
use crate::domain::round::{self, Round};
use crate::domain::{DisplayIdentity, GroupSelection, Participant};
use crate::errors::RankingError;
use crate::store::ScoreStore;

/// Knobs of a single ranking request
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOptions {
    /// Prefix of the cache key, e.g. the page the ranking is shown on
    pub namespace: String,
    pub substitute_login: String,
    pub points_max: f64,
    pub cache_enabled: bool,
    pub score_precision: i32,
    pub labels: WindowLabels,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self::from_settings(&AppConfig::default())
    }
}

impl RankingOptions {
    pub fn from_settings(config: &AppConfig) -> Self {
        Self {
            namespace: config.ranking.namespace.clone(),
            substitute_login: config.ranking.substitute_login.clone(),
            points_max: config.ranking.points_max,
            cache_enabled: config.cache.enabled,
            score_precision: config.ranking.score_precision,
            labels: WindowLabels::default(),
        }
    }
}

/// What to rank. Groups and window start out unset so a request can be
/// assembled step by step; computing an incomplete request fails.
#[derive(Debug, Clone, Default)]
pub struct RankingRequest {
    pub groups: Option<GroupSelection>,
    pub window: Option<RoundWindow>,
    pub options: RankingOptions,
}

impl RankingRequest {
    pub fn new(groups: GroupSelection, window: RoundWindow) -> Self {
        Self {
            groups: Some(groups),
            window: Some(window),
            options: RankingOptions::default(),
        }
    }

    pub fn with_groups(mut self, groups: GroupSelection) -> Self {
        self.groups = Some(groups);
        self
    }

    pub fn with_window(mut self, window: RoundWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_options(mut self, options: RankingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options.namespace = namespace.into();
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.options.cache_enabled = enabled;
        self
    }
}

/// Runs the ranking pipeline against a score store, behind a result cache.
///
/// The engine holds no per-request state and can be shared between threads
/// when its store and cache can.
pub struct RankingEngine<S: ScoreStore, C: ResultCache> {
    store: S,
    cache: C,
    cache_ttl: Duration,
    today: Option<Round>,
}

impl<S: ScoreStore, C: ResultCache> RankingEngine<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store,
            cache,
            cache_ttl: Duration::seconds(DEFAULT_TTL_SECS),
            today: None,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.cache_ttl = Duration::seconds(ttl_secs);
        self
    }

    /// Pin the current day instead of reading the wall clock
    pub fn with_today(mut self, today: Round) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn compute_ranking(&self, request: &RankingRequest) -> Result<RankingResult, RankingError> {
        let groups = request
            .groups
            .as_ref()
            .filter(|g| !g.is_empty())
            .ok_or(RankingError::MissingGroupSelection)?;
        let window = request.window.as_ref().ok_or(RankingError::MissingWindow)?;
        let options = &request.options;

        let mut result = if options.cache_enabled {
            self.cached_or_compute(groups, window, options)?
        } else {
            self.compute(groups, window, options)?
        };

        // Labels belong to the caller, never to the cached entry
        result.meta.labels = options.labels.clone();
        Ok(result)
    }

    fn cached_or_compute(
        &self,
        groups: &GroupSelection,
        window: &RoundWindow,
        options: &RankingOptions,
    ) -> Result<RankingResult, RankingError> {
        let key = CacheKey::derive(&options.namespace, groups, window);
        if let Some(result) = self.cached(&key) {
            return Ok(result);
        }

        let result = self.compute(groups, window, options)?;
        if let Err(e) = self.cache.store(&key, &CacheEntry::new(result.clone())) {
            warn!("Could not cache ranking {}: {:#}", key, e);
        }
        Ok(result)
    }

    /// Fresh cached result for `key`. Unreadable entries count as misses.
    fn cached(&self, key: &CacheKey) -> Option<RankingResult> {
        match self.cache.load(key) {
            Ok(Some(entry)) if entry.is_fresh(Utc::now(), self.cache_ttl) => {
                info!("Cache hit: {}", key);
                Some(entry.result)
            }
            Ok(Some(_)) => {
                info!("Cache entry expired: {}", key);
                None
            }
            Ok(None) => {
                info!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {:#}", key, e);
                None
            }
        }
    }

    fn compute(
        &self,
        groups: &GroupSelection,
        window: &RoundWindow,
        options: &RankingOptions,
    ) -> Result<RankingResult, RankingError> {
        let resolved = self.resolve(window)?;
        debug!(
            "Ranking '{}' over rounds {}..={}",
            groups.display_name(),
            resolved.span.min,
            resolved.span.max
        );

        let loaded = load_scores(&self.store, groups, &resolved.span, &options.substitute_login)?;
        let totals = aggregate(&loaded, &resolved);
        let round_count =
            count_eligible_rounds(loaded.table.rounds(), window.from, resolved.latest);

        let older = self
            .store
            .round_before(resolved.span.min)
            .map_err(RankingError::Store)?;
        let newer = self
            .store
            .round_after(resolved.span.max)
            .map_err(RankingError::Store)?;

        let context = ResultContext {
            groups,
            window: &resolved,
            round_count,
            points_max_per_round: options.points_max,
            score_precision: options.score_precision,
            labels: WindowLabels::default(),
            older,
            newer,
        };

        Ok(build_result(totals, &context, |p| self.display_identity(p)))
    }

    fn resolve(&self, window: &RoundWindow) -> Result<ResolvedWindow, RankingError> {
        let today = self.today.unwrap_or_else(round::today);
        let latest = self
            .store
            .latest_known_round(today)
            .map_err(RankingError::Store)?
            .unwrap_or(today);

        resolve_window(Some(window), Some(latest))
    }

    fn display_identity(&self, participant: &Participant) -> DisplayIdentity {
        match self.store.resolve_display_identity(participant) {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                warn!("No display identity for '{}'", participant.login);
                DisplayIdentity::fallback(&participant.login)
            }
            Err(e) => {
                warn!(
                    "Display identity lookup failed for '{}': {:#}",
                    participant.login, e
                );
                DisplayIdentity::fallback(&participant.login)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::domain::Group;
    use crate::store::MemoryScoreStore;

    const R1: Round = 17831;
    const R2: Round = 17838;
    const R3: Round = 17845;

    fn berlin() -> GroupSelection {
        GroupSelection::single(Group::new(1, "Berlin"))
    }

    fn engine(store: MemoryScoreStore) -> RankingEngine<MemoryScoreStore, MemoryCache> {
        RankingEngine::new(store, MemoryCache::new()).with_today(R3 + 100)
    }

    fn uncached(groups: GroupSelection, window: RoundWindow) -> RankingRequest {
        RankingRequest::new(groups, window).with_cache(false)
    }

    fn ranks(result: &RankingResult) -> Vec<(&str, u32)> {
        result
            .entries
            .iter()
            .map(|e| (e.login.as_str(), e.rank))
            .collect()
    }

    #[test]
    fn test_incomplete_request_is_not_prepared() {
        let engine = engine(MemoryScoreStore::new());

        let no_groups = RankingRequest::default().with_window(RoundWindow::single(R1));
        let error = engine.compute_ranking(&no_groups).unwrap_err();
        assert!(matches!(error, RankingError::MissingGroupSelection));

        let no_window = RankingRequest::default().with_groups(berlin());
        let error = engine.compute_ranking(&no_window).unwrap_err();
        assert!(matches!(error, RankingError::MissingWindow));

        let empty = RankingRequest::default()
            .with_groups(GroupSelection::new(Vec::new()))
            .with_window(RoundWindow::single(R1));
        assert!(engine.compute_ranking(&empty).unwrap_err().is_not_prepared());
    }

    #[test]
    fn test_single_round_ties_and_dropouts() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_participant(2, "Y")
            .with_participant(3, "Z")
            .with_participant(4, "absent")
            .with_score(1, 1, R1, 100.0)
            .with_score(2, 1, R1, 100.0)
            .with_score(3, 1, R1, 80.0)
            .with_score(4, 1, R2, 150.0);

        let result = engine(store)
            .compute_ranking(&uncached(berlin(), RoundWindow::single(R1)))
            .unwrap();

        assert_eq!(ranks(&result), vec![("X", 1), ("Y", 1), ("Z", 3)]);
        assert_eq!(result.leader().unwrap().points_diff, 0.0);
        assert_eq!(result.entry("Z").unwrap().points_diff, 20.0);
        assert_eq!(result.meta.round_count, 1);
        assert_eq!(result.meta.points_max, 200.0);
        assert_eq!(result.entry("X").unwrap().points_relative, 0.5);
        assert_eq!(result.meta.older, None);
        assert_eq!(result.meta.newer, Some(R2));
        assert_eq!(result.meta.from, "2018-10-27");
    }

    #[test]
    fn test_substitute_fills_points_but_not_played() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "regular")
            .with_participant(2, "skipper")
            .with_participant(9, "Sleepy")
            .with_score(1, 1, R1, 100.0)
            .with_score(1, 1, R2, 100.0)
            .with_score(2, 1, R1, 120.0)
            .with_score(9, 1, R2, 40.0);

        let result = engine(store)
            .compute_ranking(&uncached(berlin(), RoundWindow::new(R1, R2)))
            .unwrap();

        let skipper = result.entry("skipper").unwrap();
        assert_eq!(skipper.points, 160.0);
        assert_eq!(skipper.played, 1);
        assert_eq!(result.entry("regular").unwrap().played, 2);
    }

    #[test]
    fn test_missing_substitute_counts_missing_rounds_as_zero() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "regular")
            .with_participant(2, "skipper")
            .with_score(1, 1, R1, 100.0)
            .with_score(1, 1, R2, 100.0)
            .with_score(2, 1, R1, 120.0);

        let result = engine(store)
            .compute_ranking(&uncached(berlin(), RoundWindow::new(R1, R2)))
            .unwrap();

        assert_eq!(result.entry("skipper").unwrap().points, 120.0);
        assert_eq!(ranks(&result), vec![("regular", 1), ("skipper", 2)]);
    }

    #[test]
    fn test_trend_between_windows() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_participant(2, "Y")
            .with_score(1, 1, R1, 50.0)
            .with_score(2, 1, R1, 90.0)
            .with_score(1, 1, R2, 150.0)
            .with_score(2, 1, R2, 20.0);

        let window = RoundWindow::with_previous(R2, R2, R1, R1);
        let result = engine(store)
            .compute_ranking(&uncached(berlin(), window))
            .unwrap();

        assert!(result.meta.has_trend);
        let x = result.entry("X").unwrap();
        let y = result.entry("Y").unwrap();
        assert_eq!((x.rank, x.previous_rank, x.trend), (1, Some(2), Some(1)));
        assert_eq!((y.rank, y.previous_rank, y.trend), (2, Some(1), Some(-1)));
    }

    #[test]
    fn test_future_rounds_are_clamped_to_latest() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 50.0)
            .with_score(1, 1, R3, 70.0);

        let engine = RankingEngine::new(store, MemoryCache::new()).with_today(R2);
        let result = engine
            .compute_ranking(&uncached(berlin(), RoundWindow::new(R1, R3)))
            .unwrap();

        assert_eq!(result.entry("X").unwrap().points, 50.0);
        assert_eq!(result.meta.round_count, 1);
    }

    #[test]
    fn test_window_before_all_rounds_has_no_theoretical_max() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 50.0);

        let engine = RankingEngine::new(store, MemoryCache::new()).with_today(R1);
        let result = engine
            .compute_ranking(&uncached(berlin(), RoundWindow::new(R2, R1)))
            .unwrap();

        assert_eq!(result.meta.round_count, 0);
        assert_eq!(result.meta.points_max, 0.0);
        assert!(result.entries.iter().all(|e| e.points_relative == 0.0));
    }

    #[test]
    fn test_missing_identity_falls_back_to_login() {
        let store = MemoryScoreStore::new()
            .with_anonymous_participant(1, "ghost")
            .with_score(1, 1, R1, 10.0);

        let result = engine(store)
            .compute_ranking(&uncached(berlin(), RoundWindow::single(R1)))
            .unwrap();

        assert_eq!(result.entries[0].identity, DisplayIdentity::fallback("ghost"));
    }

    #[test]
    fn test_fresh_cache_entry_is_served_verbatim() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 10.0);
        let engine = engine(store);
        let request = RankingRequest::new(berlin(), RoundWindow::single(R1)).with_namespace("home");

        let first = engine.compute_ranking(&request).unwrap();
        assert_eq!(engine.cache().len(), 1);

        let key = CacheKey::derive("home", &berlin(), &RoundWindow::single(R1));
        let mut planted = first.clone();
        planted.meta.group_name = "planted".to_string();
        engine
            .cache()
            .store(&key, &CacheEntry::new(planted.clone()))
            .unwrap();

        assert_eq!(engine.compute_ranking(&request).unwrap(), planted);
    }

    #[test]
    fn test_stale_cache_entry_is_recomputed() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 10.0);
        let engine = engine(store);
        let request = RankingRequest::new(berlin(), RoundWindow::single(R1)).with_namespace("home");

        let fresh = engine.compute_ranking(&request).unwrap();

        let key = CacheKey::derive("home", &berlin(), &RoundWindow::single(R1));
        let mut planted = fresh.clone();
        planted.meta.group_name = "planted".to_string();
        let created = Utc::now() - Duration::seconds(DEFAULT_TTL_SECS + 1);
        engine
            .cache()
            .store(&key, &CacheEntry::created_at(planted, created))
            .unwrap();

        assert_eq!(engine.compute_ranking(&request).unwrap(), fresh);
    }

    #[test]
    fn test_disabled_cache_is_neither_read_nor_written() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 10.0);
        let engine = engine(store);

        engine
            .compute_ranking(&uncached(berlin(), RoundWindow::single(R1)))
            .unwrap();

        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_labels_follow_the_request_not_the_cache() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 10.0);
        let engine = engine(store);
        let request = RankingRequest::new(berlin(), RoundWindow::single(R1)).with_namespace("home");

        let mut week = request.clone();
        week.options.labels.current = Some("Week 43".to_string());
        let mut weekend = request;
        weekend.options.labels.current = Some("Weekend".to_string());

        let first = engine.compute_ranking(&week).unwrap();
        let second = engine.compute_ranking(&weekend).unwrap();

        assert_eq!(engine.cache().len(), 1);
        assert_eq!(first.meta.labels.current.as_deref(), Some("Week 43"));
        assert_eq!(second.meta.labels.current.as_deref(), Some("Weekend"));

        let key = CacheKey::derive("home", &berlin(), &RoundWindow::single(R1));
        let cached = engine.cache().load(&key).unwrap().unwrap();
        assert_eq!(cached.result.meta.labels, WindowLabels::default());
    }

    #[test]
    fn test_repeated_group_ranks_like_a_single_group() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 120.0);
        let twice = GroupSelection::new(vec![Group::new(1, "Berlin"), Group::new(1, "Berlin")]);

        let result = engine(store)
            .compute_ranking(&uncached(twice, RoundWindow::single(R1)))
            .unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].points, 120.0);
        assert_eq!(result.meta.points_max, 200.0);
        assert_eq!(result.meta.group_name, "Berlin");
    }

    /// Store whose every query fails
    struct FailingStore;

    impl ScoreStore for FailingStore {
        fn query_scores(
            &self,
            _groups: &GroupSelection,
            _span: &crate::ranking::window::RoundSpan,
        ) -> anyhow::Result<Vec<crate::domain::ScoreRecord>> {
            Err(anyhow::anyhow!("database is locked"))
        }

        fn query_substitute_scores(
            &self,
            _login: &str,
            _groups: &GroupSelection,
            _span: &crate::ranking::window::RoundSpan,
        ) -> anyhow::Result<Option<crate::store::RoundPoints>> {
            Err(anyhow::anyhow!("database is locked"))
        }

        fn latest_known_round(&self, _today: Round) -> anyhow::Result<Option<Round>> {
            Ok(None)
        }

        fn resolve_display_identity(
            &self,
            _participant: &Participant,
        ) -> anyhow::Result<Option<DisplayIdentity>> {
            Err(anyhow::anyhow!("database is locked"))
        }

        fn round_before(&self, _round: Round) -> anyhow::Result<Option<Round>> {
            Err(anyhow::anyhow!("database is locked"))
        }

        fn round_after(&self, _round: Round) -> anyhow::Result<Option<Round>> {
            Err(anyhow::anyhow!("database is locked"))
        }
    }

    /// Cache that can neither be read nor written
    struct FailingCache;

    impl ResultCache for FailingCache {
        fn load(&self, _key: &CacheKey) -> anyhow::Result<Option<CacheEntry>> {
            Err(anyhow::anyhow!("cache file is corrupt"))
        }

        fn store(&self, _key: &CacheKey, _entry: &CacheEntry) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    #[test]
    fn test_store_failure_aborts_the_ranking() {
        let engine = RankingEngine::new(FailingStore, MemoryCache::new()).with_today(R1);
        let request = RankingRequest::new(berlin(), RoundWindow::single(R1));

        let error = engine.compute_ranking(&request).unwrap_err();

        assert!(matches!(error, RankingError::Store(_)));
        assert!(error.to_string().contains("database is locked"));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn test_failing_cache_still_returns_a_fresh_result() {
        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 10.0);
        let engine = RankingEngine::new(store, FailingCache).with_today(R3);
        let request = RankingRequest::new(berlin(), RoundWindow::single(R1));

        let result = engine.compute_ranking(&request).unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.leader().unwrap().points, 10.0);
    }

    #[test]
    fn test_unreadable_cache_entry_counts_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = crate::cache::FileCache::new(dir.path()).unwrap();
        let key = CacheKey::derive("home", &berlin(), &RoundWindow::single(R1));
        std::fs::write(dir.path().join(format!("{}.json", key)), "{not json").unwrap();

        let store = MemoryScoreStore::new()
            .with_participant(1, "X")
            .with_score(1, 1, R1, 10.0);
        let engine = RankingEngine::new(store, cache).with_today(R3);
        let request = RankingRequest::new(berlin(), RoundWindow::single(R1)).with_namespace("home");

        let result = engine.compute_ranking(&request).unwrap();

        assert_eq!(result.leader().unwrap().login, "X");
        let repaired = engine.cache().load(&key).unwrap().unwrap();
        assert_eq!(repaired.result, result);
    }
}
