//! Bulk card catalog file parsing
//!
//! The catalog is a JSON array of card records as published by the Lorcana
//! card API. Upstream uses `Title_Case` field names; the lower-case spelling
//! written by older local exports is accepted as well.

use crate::error::Result;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// One card record from the bulk catalog file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogEntry {
    #[serde(alias = "Unique_ID")]
    pub unique_id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(rename = "type", alias = "Type", default)]
    pub card_type: String,
    #[serde(alias = "Color", default)]
    pub color: String,
    #[serde(alias = "Cost", default)]
    pub cost: Option<i64>,
    #[serde(alias = "Inkable", default)]
    pub inkable: bool,
    #[serde(alias = "Strength", default)]
    pub strength: Option<i64>,
    #[serde(alias = "Willpower", default)]
    pub willpower: Option<i64>,
    #[serde(alias = "Lore", default)]
    pub lore: Option<i64>,
    #[serde(alias = "Rarity", default)]
    pub rarity: Option<String>,
    #[serde(alias = "Classifications", default, deserialize_with = "text_or_list")]
    pub classifications: Option<String>,
    #[serde(alias = "Abilities", default, deserialize_with = "text_or_list")]
    pub abilities: Option<String>,
    #[serde(alias = "Body_Text", default)]
    pub body_text: Option<String>,
    #[serde(alias = "Image", default)]
    pub image: Option<String>,
}

/// Accepts either a delimited string or a list of strings, joining lists with ", "
fn text_or_list<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrList {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<TextOrList>::deserialize(deserializer)? {
        Some(TextOrList::Text(text)) => Some(text),
        Some(TextOrList::List(items)) if items.is_empty() => None,
        Some(TextOrList::List(items)) => Some(items.join(", ")),
        None => None,
    })
}

/// Parse catalog entries from a JSON string
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
    Ok(entries)
}

/// Read the bulk catalog file from disk
pub fn read_catalog_file<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let entries = parse_catalog(&content)?;
    log::info!(
        "Read {} catalog entries from {}",
        entries.len(),
        path.as_ref().display()
    );
    Ok(entries)
}
