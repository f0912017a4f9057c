//! Catalog store: SQLite schema and card lookups
//!
//! Uses parameterized queries exclusively (no SQL string concatenation of user input).
//! Multi-row writes are transactional.

use crate::catalog::CatalogEntry;
use crate::error::{CubeError, Result};
use crate::models::{Card, CardType};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;

/// Column list matching [`card_from_row`]
pub(crate) const CARD_COLUMNS: &str = "unique_id, name, type, color, cost, inkable, strength, \
     willpower, lore, rarity, classifications, abilities, body_text, Image, in_cube";

/// Same columns qualified with the `c` alias, for joins
pub(crate) const CARD_COLUMNS_QUALIFIED: &str = "c.unique_id, c.name, c.type, c.color, c.cost, \
     c.inkable, c.strength, c.willpower, c.lore, c.rarity, c.classifications, c.abilities, \
     c.body_text, c.Image, c.in_cube";

/// Open (or create) the cube database and initialise the schema.
///
/// Any failure here is reported as [`CubeError::StorageUnavailable`]; the
/// application must not continue without its store.
pub fn open_database<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    let unavailable = |source: Box<dyn std::error::Error + Send + Sync>| {
        CubeError::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        }
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(Box::new(e)))?;
            log::info!("Created directory: {}", parent.display());
        }
    }

    let conn = Connection::open(path).map_err(|e| unavailable(Box::new(e)))?;
    init_schema(&conn).map_err(|e| match e {
        CubeError::Database(db) => unavailable(Box::new(db)),
        other => other,
    })?;
    log::info!("Opened database: {}", path.display());
    Ok(conn)
}

/// Initialize the database schema
///
/// Creates tables if they don't exist, so it is safe to call on every start:
/// - `cards`: the catalog, with the `in_cube` membership flag
/// - `tournaments`: one row per reported tournament
/// - `tournament_decks`: one row per card copy in a winning deck
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS cards (
            unique_id TEXT PRIMARY KEY,
            name TEXT,
            type TEXT,
            color TEXT,
            cost INTEGER,
            inkable INTEGER,
            strength INTEGER,
            willpower INTEGER,
            lore INTEGER,
            rarity TEXT,
            classifications TEXT,
            abilities TEXT,
            body_text TEXT,
            Image TEXT,
            in_cube INTEGER DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_cards_in_cube ON cards(in_cube);

        CREATE TABLE IF NOT EXISTS tournaments (
            tournament_id INTEGER PRIMARY KEY AUTOINCREMENT,
            winner_name TEXT NOT NULL,
            colors TEXT NOT NULL,
            tournament_date DATE NOT NULL,
            notes TEXT
        );

        -- One row per physical copy: duplicates are expected.
        -- card_unique_id is a plain lookup key, not a foreign key.
        CREATE TABLE IF NOT EXISTS tournament_decks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tournament_id INTEGER NOT NULL,
            card_unique_id TEXT NOT NULL,
            FOREIGN KEY (tournament_id) REFERENCES tournaments(tournament_id)
        );

        CREATE INDEX IF NOT EXISTS idx_tournament_decks_tournament ON tournament_decks(tournament_id);
        CREATE INDEX IF NOT EXISTS idx_tournament_decks_card ON tournament_decks(card_unique_id);
        ",
    )?;

    log::debug!("Database schema initialized");
    Ok(())
}

/// Map a row selected with [`CARD_COLUMNS`] into a [`Card`]
pub(crate) fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    let type_label = row.get::<_, Option<String>>(2)?.unwrap_or_default();
    let color: Option<String> = row.get(3)?;
    let inkable: Option<i64> = row.get(5)?;
    let in_cube: Option<i64> = row.get(14)?;
    Ok(Card {
        unique_id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        card_type: CardType::from_label(&type_label),
        type_label: type_label.trim().to_string(),
        color: color.unwrap_or_default(),
        cost: row.get(4)?,
        inkable: inkable.unwrap_or(0) != 0,
        strength: row.get(6)?,
        willpower: row.get(7)?,
        lore: row.get(8)?,
        rarity: row.get(9)?,
        classifications: row.get(10)?,
        abilities: row.get(11)?,
        body_text: row.get(12)?,
        image: row.get(13)?,
        in_cube: in_cube.unwrap_or(0) != 0,
    })
}

/// Look up a card by id, returning `None` when it is not in the catalog
pub fn find_card(conn: &Connection, unique_id: &str) -> Result<Option<Card>> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE unique_id = ?1");
    let card = conn
        .query_row(&sql, params![unique_id], card_from_row)
        .optional()?;
    Ok(card)
}

/// Look up a card by id
pub fn get_card(conn: &Connection, unique_id: &str) -> Result<Card> {
    find_card(conn, unique_id)?.ok_or_else(|| CubeError::NotFound(unique_id.to_string()))
}

/// All cards in the catalog, in no particular order
pub fn all_cards(conn: &Connection) -> Result<Vec<Card>> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM cards");
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map([], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cards)
}

/// Get total count of cards in the catalog
pub fn card_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Load catalog entries into the store
///
/// New cards are inserted outside the cube. Existing cards get their static
/// attributes refreshed while keeping their membership flag.
/// All rows are written in one transaction.
pub fn upsert_cards(conn: &mut Connection, entries: &[CatalogEntry]) -> Result<usize> {
    let tx = conn.transaction()?;
    let count = upsert_cards_tx(&tx, entries)?;
    tx.commit()?;
    log::info!("Upserted {} cards into catalog", count);
    Ok(count)
}

fn upsert_cards_tx(tx: &Transaction<'_>, entries: &[CatalogEntry]) -> Result<usize> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO cards (
            unique_id, name, type, color, cost, inkable, strength, willpower, lore,
            rarity, classifications, abilities, body_text, Image, in_cube
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0)
        ON CONFLICT(unique_id) DO UPDATE SET
            name            = excluded.name,
            type            = excluded.type,
            color           = excluded.color,
            cost            = excluded.cost,
            inkable         = excluded.inkable,
            strength        = excluded.strength,
            willpower       = excluded.willpower,
            lore            = excluded.lore,
            rarity          = excluded.rarity,
            classifications = excluded.classifications,
            abilities       = excluded.abilities,
            body_text       = excluded.body_text,
            Image           = excluded.Image
            -- in_cube is left untouched",
    )?;

    let mut count = 0;
    for entry in entries {
        stmt.execute(params![
            &entry.unique_id,
            &entry.name,
            &entry.card_type,
            &entry.color,
            entry.cost,
            entry.inkable as i64,
            entry.strength,
            entry.willpower,
            entry.lore,
            &entry.rarity,
            &entry.classifications,
            &entry.abilities,
            &entry.body_text,
            &entry.image,
        ])?;
        count += 1;
    }
    Ok(count)
}

/// Escape `%`, `_` and `\` so user text is matched literally by `LIKE ... ESCAPE '\'`
pub(crate) fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Create an in-memory database for testing
    pub fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    /// Catalog entry with sensible defaults for a Character
    pub fn entry(unique_id: &str, name: &str, color: &str) -> CatalogEntry {
        CatalogEntry {
            unique_id: unique_id.to_string(),
            name: name.to_string(),
            card_type: "Character".to_string(),
            color: color.to_string(),
            cost: Some(3),
            inkable: true,
            strength: Some(2),
            willpower: Some(3),
            lore: Some(1),
            rarity: Some("Common".to_string()),
            ..Default::default()
        }
    }

    /// Database seeded with the given entries
    pub fn seeded_db(entries: &[CatalogEntry]) -> Connection {
        let mut conn = test_db();
        upsert_cards(&mut conn, entries).unwrap();
        conn
    }

    /// Flip the membership flag directly, bypassing membership checks
    pub fn set_in_cube(conn: &Connection, unique_id: &str) {
        conn.execute(
            "UPDATE cards SET in_cube = 1 WHERE unique_id = ?1",
            params![unique_id],
        )
        .unwrap();
    }
}
