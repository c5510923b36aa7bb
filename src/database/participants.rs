use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::DbParticipant;
use crate::domain::{DisplayIdentity, ParticipantId};
use crate::errors::query_context;

pub fn insert_participant(
    conn: &mut DbConn,
    login: &str,
    display_name: Option<&str>,
    display_class: &str,
) -> Result<DbParticipant> {
    let sql = "INSERT INTO participants (login, display_name, display_class) VALUES (?1, ?2, ?3) RETURNING id, login, display_name, display_class";

    conn.query_row(
        sql,
        params![login, display_name, display_class],
        parse_participant_row,
    )
    .with_context(|| format!("Failed to insert participant {}", login))
}

/// Returns the participant with `login`, registering it with the default
/// display class if it is missing
pub fn ensure_participant(conn: &mut DbConn, login: &str) -> Result<DbParticipant> {
    match find_by_login(conn, login)? {
        Some(participant) => Ok(participant),
        None => insert_participant(conn, login, None, DisplayIdentity::DEFAULT_CLASS),
    }
}

fn parse_participant_row(row: &rusqlite::Row) -> rusqlite::Result<DbParticipant> {
    Ok(DbParticipant {
        id: row.get(0)?,
        login: row.get(1)?,
        display_name: row.get(2)?,
        display_class: row.get(3)?,
    })
}

pub fn find_by_login(conn: &mut DbConn, login: &str) -> Result<Option<DbParticipant>> {
    let sql = "SELECT id, login, display_name, display_class FROM participants WHERE login = ?1";

    conn.query_row(sql, params![login], parse_participant_row)
        .optional()
        .context(query_context("participant by login"))
}

pub fn find_by_id(conn: &mut DbConn, id: ParticipantId) -> Result<Option<DbParticipant>> {
    let sql = "SELECT id, login, display_name, display_class FROM participants WHERE id = ?1";

    conn.query_row(sql, params![id], parse_participant_row)
        .optional()
        .context(query_context("participant by id"))
}
