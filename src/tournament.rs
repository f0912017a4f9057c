//! Tournament ledger: append-only draft results and win aggregates.
//!
//! A tournament row is written together with one deck row per card copy in
//! the winning deck. Deck rows reference cards by id only; a card that has
//! since left the catalog is dropped from joined results instead of failing.

use crate::database::{card_from_row, CARD_COLUMNS_QUALIFIED};
use crate::error::{CubeError, Result};
use crate::models::{split_ink_tokens, Card, CardType, Ink};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use std::fmt;

/// Minimum deck size for a draft deck (checked by the front end, not the ledger)
pub const MIN_DECK_SIZE: usize = 40;

/// Card every player may add to their deck without it counting toward [`MIN_DECK_SIZE`]
pub const BONUS_CARD_NAME: &str = "Hidden Inkcaster";

/// Number of rows returned by [`card_winrate`]
pub const CARD_WINRATE_LIMIT: usize = 50;

/// A deck's inks: 1 to 3 distinct inks, kept in canonical ink order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorIdentity {
    inks: Vec<Ink>,
}

impl ColorIdentity {
    pub const MAX_INKS: usize = 3;

    /// Build an identity from ink names in any order. Duplicates collapse.
    pub fn new<I, S>(colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inks = Vec::new();
        for color in colors {
            let color = color.as_ref();
            let ink = Ink::parse(color).ok_or_else(|| {
                CubeError::InvalidColorIdentity(format!("unknown ink '{}'", color.trim()))
            })?;
            inks.push(ink);
        }
        inks.sort();
        inks.dedup();

        if inks.is_empty() || inks.len() > Self::MAX_INKS {
            return Err(CubeError::InvalidColorIdentity(format!(
                "expected 1 to {} inks, got {}",
                Self::MAX_INKS,
                inks.len()
            )));
        }
        Ok(Self { inks })
    }

    /// Parse a slash- or comma-separated identity such as "Ruby/Amber"
    pub fn parse(s: &str) -> Result<Self> {
        Self::new(split_ink_tokens(s))
    }

    pub fn inks(&self) -> &[Ink] {
        &self.inks
    }
}

impl fmt::Display for ColorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.inks.iter().map(Ink::as_str).collect();
        f.write_str(&joined.join("/"))
    }
}

/// A tournament result to be recorded
#[derive(Debug, Clone)]
pub struct NewTournament {
    pub winner_name: String,
    pub colors: ColorIdentity,
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// One entry per physical copy in the winning deck
    pub deck: Vec<String>,
}

/// A recorded tournament
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tournament {
    pub id: i64,
    pub winner_name: String,
    /// Stored identity string, e.g. "Amber/Ruby"
    pub colors: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

/// Record a tournament and its winning deck.
///
/// The tournament row and every deck row are written in one transaction:
/// either all of them land or none do. Duplicate ids are kept as separate rows.
pub fn report_tournament(conn: &mut Connection, tournament: &NewTournament) -> Result<i64> {
    if tournament.deck.is_empty() {
        return Err(CubeError::EmptyDeck);
    }

    let tx = conn.transaction()?;
    let id = report_tournament_tx(&tx, tournament)?;
    tx.commit()?;

    log::info!(
        "Tournament {} recorded: {} - {} ({} cards)",
        id,
        tournament.winner_name,
        tournament.colors,
        tournament.deck.len()
    );
    Ok(id)
}

fn report_tournament_tx(tx: &Transaction<'_>, tournament: &NewTournament) -> Result<i64> {
    tx.execute(
        "INSERT INTO tournaments (winner_name, colors, tournament_date, notes)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            tournament.winner_name.trim(),
            tournament.colors.to_string(),
            tournament.date,
            tournament.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()),
        ],
    )?;
    let id = tx.last_insert_rowid();

    let mut stmt = tx.prepare_cached(
        "INSERT INTO tournament_decks (tournament_id, card_unique_id) VALUES (?1, ?2)",
    )?;
    for card_id in &tournament.deck {
        stmt.execute(params![id, card_id.trim()])?;
    }
    Ok(id)
}

fn tournament_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        winner_name: row.get(1)?,
        colors: row.get(2)?,
        date: row.get(3)?,
        notes: row.get(4)?,
    })
}

/// All tournaments, newest date first
pub fn all_tournaments(conn: &Connection) -> Result<Vec<Tournament>> {
    let mut stmt = conn.prepare(
        "SELECT tournament_id, winner_name, colors, tournament_date, notes
         FROM tournaments
         ORDER BY tournament_date DESC, tournament_id DESC",
    )?;
    let tournaments = stmt
        .query_map([], tournament_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tournaments)
}

/// Look up one tournament
pub fn get_tournament(conn: &Connection, id: i64) -> Result<Tournament> {
    conn.query_row(
        "SELECT tournament_id, winner_name, colors, tournament_date, notes
         FROM tournaments WHERE tournament_id = ?1",
        params![id],
        tournament_from_row,
    )
    .optional()?
    .ok_or(CubeError::TournamentNotFound(id))
}

/// Winning deck of a tournament, one card per copy, in the order it was reported
pub fn tournament_deck(conn: &Connection, id: i64) -> Result<Vec<Card>> {
    get_tournament(conn, id)?;

    let sql = format!(
        "SELECT {CARD_COLUMNS_QUALIFIED}
         FROM tournament_decks td
         JOIN cards c ON c.unique_id = td.card_unique_id
         WHERE td.tournament_id = ?1
         ORDER BY td.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![id], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cards)
}

/// How often a card appeared in winning decks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardWinrate {
    pub unique_id: String,
    pub name: String,
    pub card_type: CardType,
    pub color: String,
    /// Number of deck rows for this card across all tournaments
    pub wins: usize,
}

/// Cards with the most winning-deck appearances (top [`CARD_WINRATE_LIMIT`])
pub fn card_winrate(conn: &Connection) -> Result<Vec<CardWinrate>> {
    let mut stmt = conn.prepare(
        "SELECT c.unique_id, c.name, c.type, c.color, COUNT(td.id) AS wins
         FROM tournament_decks td
         JOIN cards c ON c.unique_id = td.card_unique_id
         GROUP BY c.unique_id
         ORDER BY wins DESC, c.name, c.unique_id
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![CARD_WINRATE_LIMIT as i64], |row| {
            let card_type: Option<String> = row.get(2)?;
            let wins: i64 = row.get(4)?;
            Ok(CardWinrate {
                unique_id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                card_type: CardType::from_label(card_type.as_deref().unwrap_or_default()),
                color: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                wins: wins as usize,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Tournaments won per color identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorWinrate {
    pub colors: String,
    pub tournaments: usize,
}

/// Tournaments won per exact stored color identity, most wins first
pub fn color_winrate(conn: &Connection) -> Result<Vec<ColorWinrate>> {
    let mut stmt = conn.prepare(
        "SELECT colors, COUNT(*) AS wins
         FROM tournaments
         GROUP BY colors
         ORDER BY wins DESC, colors",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let wins: i64 = row.get(1)?;
            Ok(ColorWinrate {
                colors: row.get(0)?,
                tournaments: wins as usize,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Wins per player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinnerStats {
    pub winner_name: String,
    pub wins: usize,
    /// Distinct color identities this player has won with, sorted
    pub colors_used: Vec<String>,
}

/// Wins per player name, most wins first
pub fn winner_stats(conn: &Connection) -> Result<Vec<WinnerStats>> {
    let mut stmt = conn.prepare(
        "SELECT winner_name, COUNT(*) AS wins, GROUP_CONCAT(DISTINCT colors) AS colors_used
         FROM tournaments
         GROUP BY winner_name
         ORDER BY wins DESC, winner_name",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let wins: i64 = row.get(1)?;
            let colors_used: Option<String> = row.get(2)?;
            // Identities are slash-joined, so the default ',' separator is unambiguous
            let mut colors_used: Vec<String> = colors_used
                .unwrap_or_default()
                .split(',')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            colors_used.sort();
            Ok(WinnerStats {
                winner_name: row.get(0)?,
                wins: wins as usize,
                colors_used,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Returns true if `card` is the free bonus card
pub fn is_bonus_card(card: &Card) -> bool {
    card.name.trim().eq_ignore_ascii_case(BONUS_CARD_NAME)
}

/// Deck size as counted for the minimum: one bonus card copy is free
pub fn counted_deck_size(deck: &[Card]) -> usize {
    let bonus_copies = deck.iter().filter(|card| is_bonus_card(card)).count();
    deck.len() - bonus_copies.min(1)
}

/// Returns true if the deck reaches [`MIN_DECK_SIZE`] without the bonus card
pub fn meets_minimum_deck_size(deck: &[Card]) -> bool {
    counted_deck_size(deck) >= MIN_DECK_SIZE
}

/// Parse a deck list with one card id per line, optionally prefixed by a copy count.
///
/// ```text
/// 2 TFC-001
/// TFC-042
/// ```
///
/// Blank lines, `#` comments and a `Deck` header line are skipped.
pub fn parse_deck_list(text: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.eq_ignore_ascii_case("deck") {
            continue;
        }
        match parse_deck_line(line) {
            Some((copies, id)) => ids.extend(std::iter::repeat_n(id.to_string(), copies)),
            None => log::warn!("Skipping unreadable deck line: {}", line),
        }
    }
    ids
}

fn parse_deck_line(line: &str) -> Option<(usize, &str)> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let first = parts.next()?;
    match parts.next().map(str::trim) {
        Some(rest) if !rest.is_empty() => {
            let copies: usize = first.parse().ok()?;
            Some((copies, rest))
        }
        _ => Some((1, first)),
    }
}

#[cfg(test)]
#[path = "tournament_tests.rs"]
mod tests;
