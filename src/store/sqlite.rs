use anyhow::{Context, Result};
use log::debug;

use super::{RoundPoints, ScoreStore, profile_link};
use crate::database::{self, DbConn, DbPool, ScoreRow};
use crate::domain::{DisplayIdentity, GroupSelection, Participant, Round, ScoreRecord};
use crate::ranking::window::RoundSpan;

/// Score store backed by the SQLite score database
pub struct SqliteScoreStore {
    pool: DbPool,
}

impl SqliteScoreStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn open(database_path: &str) -> Result<Self> {
        Ok(Self::new(database::create_pool(database_path)?))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn connection(&self) -> Result<DbConn> {
        database::get_connection(&self.pool)
    }
}

impl ScoreStore for SqliteScoreStore {
    fn query_scores(&self, groups: &GroupSelection, span: &RoundSpan) -> Result<Vec<ScoreRecord>> {
        let mut conn = self.connection()?;
        let rows =
            database::scores::aggregate_scores(&mut conn, &groups.ids(), span.min, span.max)?;
        debug!(
            "Loaded {} score rows for groups {:?} between {} and {}",
            rows.len(),
            groups.ids(),
            span.min,
            span.max
        );
        Ok(rows.into_iter().map(to_score_record).collect())
    }

    fn query_substitute_scores(
        &self,
        login: &str,
        groups: &GroupSelection,
        span: &RoundSpan,
    ) -> Result<Option<RoundPoints>> {
        let mut conn = self.connection()?;
        let Some(substitute) = database::participants::find_by_login(&mut conn, login)? else {
            return Ok(None);
        };

        let points = database::scores::participant_round_points(
            &mut conn,
            substitute.id,
            &groups.ids(),
            span.min,
            span.max,
        )
        .with_context(|| format!("Failed to load scores of substitute {}", login))?;

        Ok(Some(points.into_iter().collect()))
    }

    fn latest_known_round(&self, today: Round) -> Result<Option<Round>> {
        let mut conn = self.connection()?;
        database::rounds::latest_until(&mut conn, today)
    }

    fn resolve_display_identity(
        &self,
        participant: &Participant,
    ) -> Result<Option<DisplayIdentity>> {
        let mut conn = self.connection()?;
        let found = database::participants::find_by_id(&mut conn, participant.id)?;

        Ok(found.map(|p| DisplayIdentity {
            display_name: p.display_name.unwrap_or_else(|| p.login.clone()),
            display_class: p.display_class,
            profile_link: profile_link(&p.login),
        }))
    }

    fn round_before(&self, round: Round) -> Result<Option<Round>> {
        let mut conn = self.connection()?;
        database::rounds::scored_before(&mut conn, round)
    }

    fn round_after(&self, round: Round) -> Result<Option<Round>> {
        let mut conn = self.connection()?;
        database::rounds::scored_after(&mut conn, round)
    }
}

fn to_score_record(row: ScoreRow) -> ScoreRecord {
    ScoreRecord {
        participant: Participant::new(row.participant_id, row.login),
        round: row.round,
        points: row.points,
    }
}
