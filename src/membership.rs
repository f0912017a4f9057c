//! Cube membership: the in/out-of-cube flag on each catalog card.
//!
//! Every toggle is committed on its own; there is no batching.

use crate::database::{card_from_row, get_card, CARD_COLUMNS};
use crate::error::{CubeError, Result};
use crate::models::{Card, SortKey};
use rusqlite::{params, Connection};

/// Add a card to the cube.
///
/// Fails with `NotFound` for an unknown id and `AlreadyMember` if the card is
/// already in the cube.
pub fn add_to_cube(conn: &Connection, unique_id: &str) -> Result<()> {
    let card = get_card(conn, unique_id)?;
    if card.in_cube {
        return Err(CubeError::AlreadyMember(unique_id.to_string()));
    }
    set_membership(conn, unique_id, true)?;
    log::info!("Added {} ({}) to cube", card.name, unique_id);
    Ok(())
}

/// Remove a card from the cube.
///
/// Fails with `NotFound` for an unknown id and `NotMember` if the card is not
/// in the cube.
pub fn remove_from_cube(conn: &Connection, unique_id: &str) -> Result<()> {
    let card = get_card(conn, unique_id)?;
    if !card.in_cube {
        return Err(CubeError::NotMember(unique_id.to_string()));
    }
    set_membership(conn, unique_id, false)?;
    log::info!("Removed {} ({}) from cube", card.name, unique_id);
    Ok(())
}

fn set_membership(conn: &Connection, unique_id: &str, in_cube: bool) -> Result<()> {
    conn.execute(
        "UPDATE cards SET in_cube = ?1 WHERE unique_id = ?2",
        params![in_cube as i64, unique_id],
    )?;
    Ok(())
}

/// Number of cards currently in the cube
pub fn cube_size(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards WHERE in_cube = 1", [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}

/// Number of cube cards of the given type (case-insensitive)
pub fn type_count(conn: &Connection, card_type: &str) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cards WHERE in_cube = 1 AND LOWER(type) = LOWER(?1)",
        params![card_type.trim()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// All cube cards, sorted by `sort` (name when `None`); ties are broken by name
pub fn cube_cards(conn: &Connection, sort: Option<SortKey>) -> Result<Vec<Card>> {
    let order_by = match sort.unwrap_or_default() {
        SortKey::Name => "name, unique_id",
        SortKey::Cost => "cost, name, unique_id",
        SortKey::Color => "color, name, unique_id",
        SortKey::Type => "type, name, unique_id",
    };
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE in_cube = 1 ORDER BY {order_by}");
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map([], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    log::debug!("Loaded {} cube cards", cards.len());
    Ok(cards)
}

/// Ids of all cube cards, ordered by card name
pub fn cube_card_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT unique_id FROM cards WHERE in_cube = 1 ORDER BY name, unique_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}
