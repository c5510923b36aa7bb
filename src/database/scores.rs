use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter};

use super::connection::DbConn;
use super::groups::placeholders;
use super::models::ScoreRow;
use super::rounds::insert_round;
use crate::domain::{GroupId, ParticipantId, Round};
use crate::errors::query_context;

/// Stores the points of one participant for one group and round, replacing
/// earlier points for the same slot. The round is scheduled on the fly if
/// it is not known yet.
pub fn insert_score(
    conn: &mut DbConn,
    participant_id: ParticipantId,
    group_id: GroupId,
    round: Round,
    points: f64,
) -> Result<()> {
    insert_round(conn, round)?;

    let sql = "INSERT INTO scores (participant_id, group_id, round, points) VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT (participant_id, group_id, round) DO UPDATE SET points = excluded.points";
    conn.execute(sql, params![participant_id, group_id, round, points])
        .with_context(|| {
            format!(
                "Failed to insert score of participant {} for group {} round {}",
                participant_id, group_id, round
            )
        })
        .map(|_| ())
}

/// Points per participant and round, summed over the given groups.
///
/// With more than one group only rows where the participant scored in
/// every group of that round are returned. Rows come ordered by
/// participant id, then round.
pub fn aggregate_scores(
    conn: &mut DbConn,
    group_ids: &[GroupId],
    min: Round,
    max: Round,
) -> Result<Vec<ScoreRow>> {
    let sql = build_aggregate_sql(group_ids.len());
    let values = bound_values(group_ids, min, max);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), parse_score_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context(query_context("aggregated scores"))?;

    Ok(rows)
}

fn build_aggregate_sql(group_count: usize) -> String {
    let inner = format!(
        "SELECT s.round AS round, p.id AS id, p.login AS login, \
         SUM(s.points) AS points, COUNT(*) AS played \
         FROM scores AS s JOIN participants AS p ON p.id = s.participant_id \
         WHERE s.group_id IN ({}) AND s.round BETWEEN ?1 AND ?2 \
         GROUP BY p.id, s.round",
        placeholders(group_count, 3)
    );

    if group_count > 1 {
        format!(
            "SELECT round, id, login, points FROM ({}) AS x \
             WHERE x.played = {} ORDER BY x.id, x.round",
            inner, group_count
        )
    } else {
        format!("{} ORDER BY p.id, s.round", inner)
    }
}

fn bound_values(group_ids: &[GroupId], min: Round, max: Round) -> Vec<i64> {
    let mut values = vec![i64::from(min), i64::from(max)];
    values.extend_from_slice(group_ids);
    values
}

fn parse_score_row(row: &rusqlite::Row) -> rusqlite::Result<ScoreRow> {
    Ok(ScoreRow {
        round: row.get(0)?,
        participant_id: row.get(1)?,
        login: row.get(2)?,
        points: row.get(3)?,
    })
}

/// Per-round points of a single participant, summed over the given groups.
/// No participation filter is applied.
pub fn participant_round_points(
    conn: &mut DbConn,
    participant_id: ParticipantId,
    group_ids: &[GroupId],
    min: Round,
    max: Round,
) -> Result<Vec<(Round, f64)>> {
    let sql = format!(
        "SELECT round, SUM(points) FROM scores \
         WHERE participant_id = ?{} AND group_id IN ({}) AND round BETWEEN ?1 AND ?2 \
         GROUP BY round ORDER BY round",
        group_ids.len() + 3,
        placeholders(group_ids.len(), 3)
    );

    let mut values = bound_values(group_ids, min, max);
    values.push(participant_id);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context(query_context("substitute scores"))?;

    Ok(rows)
}
