use anyhow::{Context, Result, bail};
use rusqlite::{OptionalExtension, params, params_from_iter};

use super::connection::DbConn;
use super::models::DbGroup;
use crate::domain::GroupId;
use crate::errors::query_context;

pub fn insert_group(conn: &mut DbConn, id: GroupId, name: &str) -> Result<DbGroup> {
    let sql = "INSERT INTO competition_groups (id, name) VALUES (?1, ?2) RETURNING id, name";

    conn.query_row(sql, params![id, name], parse_group_row)
        .with_context(|| format!("Failed to insert group {}", name))
}

/// Returns the group with `id`, creating it under `name` if it is missing
pub fn ensure_group(conn: &mut DbConn, id: GroupId, name: &str) -> Result<DbGroup> {
    match find_by_id(conn, id)? {
        Some(group) => Ok(group),
        None => insert_group(conn, id, name),
    }
}

pub fn find_by_id(conn: &mut DbConn, id: GroupId) -> Result<Option<DbGroup>> {
    conn.query_row(
        "SELECT id, name FROM competition_groups WHERE id = ?1",
        params![id],
        parse_group_row,
    )
    .optional()
    .context(query_context("group by id"))
}

fn parse_group_row(row: &rusqlite::Row) -> rusqlite::Result<DbGroup> {
    Ok(DbGroup {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Loads the given groups in the order they were asked for.
/// Fails if any id is unknown.
pub fn find_by_ids(conn: &mut DbConn, ids: &[GroupId]) -> Result<Vec<DbGroup>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, name FROM competition_groups WHERE id IN ({})",
        placeholders(ids.len(), 1)
    );

    let mut stmt = conn.prepare(&sql)?;
    let found = stmt
        .query_map(params_from_iter(ids.iter()), parse_group_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context(query_context("groups"))?;

    let mut ordered = Vec::with_capacity(ids.len());
    for id in ids {
        match found.iter().find(|g| g.id == *id) {
            Some(group) => ordered.push(group.clone()),
            None => bail!("Unknown group id: {}", id),
        }
    }
    Ok(ordered)
}

/// `?first, ?first+1, ...` for `count` numbered parameters
pub(crate) fn placeholders(count: usize, first: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
