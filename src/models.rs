use serde::Serialize;
use std::fmt;

/// The six Lorcana inks, in the order the game lists them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ink {
    Amber,
    Amethyst,
    Emerald,
    Ruby,
    Sapphire,
    Steel,
}

impl Ink {
    /// Returns the display name of the ink (e.g., "Amber")
    pub fn as_str(&self) -> &'static str {
        match self {
            Ink::Amber => "Amber",
            Ink::Amethyst => "Amethyst",
            Ink::Emerald => "Emerald",
            Ink::Ruby => "Ruby",
            Ink::Sapphire => "Sapphire",
            Ink::Steel => "Steel",
        }
    }

    /// Parse an ink name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "amber" => Some(Ink::Amber),
            "amethyst" => Some(Ink::Amethyst),
            "emerald" => Some(Ink::Emerald),
            "ruby" => Some(Ink::Ruby),
            "sapphire" => Some(Ink::Sapphire),
            "steel" => Some(Ink::Steel),
            _ => None,
        }
    }
}

impl fmt::Display for Ink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card type as printed on the card.
///
/// Labels outside the known set are kept verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum CardType {
    Character,
    Action,
    ActionSong,
    Item,
    Location,
    Other(String),
}

impl CardType {
    /// Parse a type label. Never fails.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let normalized: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "character" => CardType::Character,
            "action" => CardType::Action,
            "actionsong" | "song" => CardType::ActionSong,
            "item" => CardType::Item,
            "location" => CardType::Location,
            _ => CardType::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CardType::Character => "Character",
            CardType::Action => "Action",
            CardType::ActionSong => "Action - Song",
            CardType::Item => "Item",
            CardType::Location => "Location",
            CardType::Other(label) => label,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<CardType> for String {
    fn from(card_type: CardType) -> Self {
        card_type.label().to_string()
    }
}

/// A card from the catalog, including its cube membership flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub unique_id: String,
    pub name: String,
    pub card_type: CardType,
    /// Type text exactly as stored in the catalog, trimmed (e.g. "Action-Song")
    pub type_label: String,
    /// Raw ink text, e.g. "Amber" or "Amber/Ruby"
    pub color: String,
    pub cost: Option<i64>,
    pub inkable: bool,
    pub strength: Option<i64>,
    pub willpower: Option<i64>,
    pub lore: Option<i64>,
    pub rarity: Option<String>,
    /// Raw classification text, e.g. "Storyborn, Hero, Princess"
    pub classifications: Option<String>,
    pub abilities: Option<String>,
    pub body_text: Option<String>,
    pub image: Option<String>,
    pub in_cube: bool,
}

impl Card {
    /// Returns true if this card is a Character
    pub fn is_character(&self) -> bool {
        self.card_type == CardType::Character
    }

    /// Returns true if the card has more than one ink
    pub fn is_multicolor(&self) -> bool {
        self.color.contains('/') || self.color.contains(',')
    }

    /// Classification tags parsed from the delimited classification text
    pub fn classification_tags(&self) -> Vec<String> {
        self.classifications
            .as_deref()
            .map(parse_classification_tags)
            .unwrap_or_default()
    }
}

/// Split a raw color string into trimmed, non-empty ink tokens
pub fn split_ink_tokens(color: &str) -> Vec<&str> {
    color
        .split(['/', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Split classification text on commas.
///
/// Tolerates the JSON-list spelling written by older imports
/// (`["Storyborn", "Hero"]`) by trimming brackets and quotes from each tag.
pub fn parse_classification_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| {
            tag.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '[' | ']'))
        })
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sort order for listing cube cards. Ties are always broken by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Cost,
    Color,
    Type,
}

impl SortKey {
    /// Parse a sort key name (e.g., "cost")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(SortKey::Name),
            "cost" => Some(SortKey::Cost),
            "color" | "ink" => Some(SortKey::Color),
            "type" => Some(SortKey::Type),
            _ => None,
        }
    }
}
