use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use crate::domain::Round;
use crate::errors::query_context;

pub fn insert_round(conn: &mut DbConn, round: Round) -> Result<()> {
    conn.execute("INSERT OR IGNORE INTO rounds (round) VALUES (?1)", params![round])
        .context("Failed to insert round")
        .map(|_| ())
}

/// Latest scheduled round on or before `today`
pub fn latest_until(conn: &mut DbConn, today: Round) -> Result<Option<Round>> {
    let sql = "SELECT MAX(round) FROM rounds WHERE round <= ?1";
    conn.query_row(sql, params![today], |row| row.get(0))
        .context(query_context("latest round"))
}

/// Closest round with recorded scores strictly before `round`
pub fn scored_before(conn: &mut DbConn, round: Round) -> Result<Option<Round>> {
    let sql = "SELECT MAX(round) FROM scores WHERE round < ?1";
    conn.query_row(sql, params![round], |row| row.get(0))
        .context(query_context("previous round"))
}

/// Closest round with recorded scores strictly after `round`
pub fn scored_after(conn: &mut DbConn, round: Round) -> Result<Option<Round>> {
    let sql = "SELECT MIN(round) FROM scores WHERE round > ?1";
    conn.query_row(sql, params![round], |row| row.get(0))
        .context(query_context("later round"))
}
