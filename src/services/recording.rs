use anyhow::Result;
use log::info;

use crate::config::AppConfig;
use crate::database::{self, DbPool};
use crate::domain::round::format_round;
use crate::domain::{GroupId, Round};

/// One score to put into the database
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub group_id: GroupId,
    pub group_name: Option<String>,
    pub login: String,
    pub round: Round,
    pub points: f64,
}

/// Writes scores, registering unknown groups and participants on the way
pub struct RecordingService {
    pool: DbPool,
}

impl RecordingService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            pool: database::create_pool(&config.store.database_path)?,
        })
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn record(&self, entry: &ScoreEntry) -> Result<()> {
        let mut conn = database::get_connection(&self.pool)?;

        let group_name = entry
            .group_name
            .clone()
            .unwrap_or_else(|| entry.group_id.to_string());
        let group = database::groups::ensure_group(&mut conn, entry.group_id, &group_name)?;
        let participant = database::participants::ensure_participant(&mut conn, &entry.login)?;
        database::scores::insert_score(
            &mut conn,
            participant.id,
            group.id,
            entry.round,
            entry.points,
        )?;

        info!(
            "Recorded {} points for {} in {} on {}",
            entry.points,
            participant.login,
            group.name,
            format_round(entry.round)
        );
        Ok(())
    }
}
