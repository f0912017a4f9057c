//! Card search and compound filtering over the catalog

use crate::database::{all_cards, card_from_row, like_pattern, CARD_COLUMNS};
use crate::error::Result;
use crate::models::{split_ink_tokens, Card};
use rusqlite::{params, Connection};
use std::collections::HashSet;

/// Search cards by name (case-insensitive substring match).
///
/// An empty query matches every card. Results are ordered by name.
pub fn search_by_name(conn: &Connection, query: &str, cube_only: bool) -> Result<Vec<Card>> {
    let sql = format!(
        "SELECT {CARD_COLUMNS} FROM cards
         WHERE name LIKE ?1 ESCAPE '\\'
           AND (?2 = 0 OR in_cube = 1)
         ORDER BY name, unique_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![like_pattern(query), cube_only as i64], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    log::debug!("Name search '{}' found {} cards", query, cards.len());
    Ok(cards)
}

/// Search cards whose ability text OR body text contains `text` (case-insensitive)
pub fn search_by_effect(conn: &Connection, text: &str, cube_only: bool) -> Result<Vec<Card>> {
    let sql = format!(
        "SELECT {CARD_COLUMNS} FROM cards
         WHERE (body_text LIKE ?1 ESCAPE '\\'
                OR abilities LIKE ?1 ESCAPE '\\')
           AND (?2 = 0 OR in_cube = 1)
         ORDER BY name, unique_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![like_pattern(text), cube_only as i64], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    log::debug!("Effect search '{}' found {} cards", text, cards.len());
    Ok(cards)
}

/// Cube cards whose body text contains `text` (case-insensitive).
///
/// Blank text returns nothing rather than the whole cube.
pub fn search_body_text(conn: &Connection, text: &str) -> Result<Vec<Card>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {CARD_COLUMNS} FROM cards
         WHERE in_cube = 1 AND body_text LIKE ?1 ESCAPE '\\'
         ORDER BY name, unique_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map(params![like_pattern(text)], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cards)
}

/// Compound card filter. Every set predicate must match; unset predicates pass.
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    /// Substring looked up in name, id, body text or classifications
    pub text: Option<String>,
    /// Matches if any of the card's inks is in this set
    pub colors: Option<HashSet<String>>,
    /// Exact (case-insensitive) type labels
    pub types: Option<HashSet<String>>,
    pub inkable: Option<bool>,
    pub in_cube: Option<bool>,
}

impl CardFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn inkable(mut self, inkable: bool) -> Self {
        self.inkable = Some(inkable);
        self
    }

    pub fn in_cube(mut self, in_cube: bool) -> Self {
        self.in_cube = Some(in_cube);
        self
    }

    /// Returns true if `card` satisfies every predicate of this filter
    pub fn matches(&self, card: &Card) -> bool {
        self.matches_text(card)
            && self.matches_colors(card)
            && self.matches_types(card)
            && self.inkable.is_none_or(|inkable| card.inkable == inkable)
            && self.in_cube.is_none_or(|in_cube| card.in_cube == in_cube)
    }

    fn matches_text(&self, card: &Card) -> bool {
        let Some(text) = self.text.as_deref() else {
            return true;
        };
        let needle = text.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        contains(card.name.as_str())
            || contains(card.unique_id.as_str())
            || card.body_text.as_deref().is_some_and(contains)
            || card.classifications.as_deref().is_some_and(contains)
    }

    fn matches_colors(&self, card: &Card) -> bool {
        let Some(colors) = &self.colors else {
            return true;
        };
        split_ink_tokens(&card.color)
            .iter()
            .any(|ink| colors.iter().any(|wanted| wanted.trim().eq_ignore_ascii_case(ink)))
    }

    fn matches_types(&self, card: &Card) -> bool {
        let Some(types) = &self.types else {
            return true;
        };
        types
            .iter()
            .any(|wanted| card.type_label.eq_ignore_ascii_case(wanted.trim()))
    }
}

/// Apply `filter` to the whole catalog. Results are ordered by name.
pub fn filter_cards(conn: &Connection, filter: &CardFilter) -> Result<Vec<Card>> {
    let mut cards: Vec<Card> = all_cards(conn)?
        .into_iter()
        .filter(|card| filter.matches(card))
        .collect();
    cards.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.unique_id.cmp(&b.unique_id)));
    log::debug!("Filter matched {} cards", cards.len());
    Ok(cards)
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
