//! Cube statistics: categorical and numeric distributions over cube members.
//!
//! Every distribution maps a label to a [`Bucket`] holding the raw count and
//! its percentage of a denominator. Most statistics divide by the cube size;
//! the Character-centric ones (strength, willpower, lore, classifications,
//! keywords) divide by the number of Character cards. A zero denominator
//! yields 0% rather than an error, and an empty cube yields empty
//! distributions.

use crate::error::Result;
use crate::membership::cube_cards;
use crate::models::Card;
use rusqlite::Connection;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Classification tags that always get a bucket before counting
pub const CLASSIFICATIONS: &[&str] = &[
    "Alien",
    "Ally",
    "Broom",
    "Captain",
    "Deity",
    "Detective",
    "Dragon",
    "Dreamborn",
    "Entangled",
    "Fairy",
    "Floodborn",
    "Hero",
    "Hyena",
    "Inventor",
    "King",
    "Knight",
    "Madrigal",
    "Mentor",
    "Musketeer",
    "Pirate",
    "Prince",
    "Princess",
    "Puppy",
    "Queen",
    "Racer",
    "Seven Dwarfs",
    "Song",
    "Sorcerer",
    "Storyborn",
    "Tigger",
    "Titan",
    "Villain",
];

/// Keywords counted by [`CubeStats::by_keyword`]
pub const KEYWORDS: &[&str] = &[
    "Challenger",
    "Evasive",
    "Rush",
    "Ward",
    "Shift",
    "Bodyguard",
    "Reckless",
    "Singer",
    "Support",
    "Resist",
];

/// Label used for multi-ink colors by [`CubeStats::by_color_family`]
pub const MULTICOLOR: &str = "Multicolor";

/// Label used when a text attribute is blank
pub const NO_VALUE: &str = "None";

/// Count and share of one distribution bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket {
    pub count: usize,
    /// `count / denominator * 100`, or 0 when the denominator is 0
    pub percentage: f64,
}

fn percentage(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        count as f64 / denominator as f64 * 100.0
    }
}

/// A numeric card attribute that may be absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatValue {
    Missing,
    Value(i64),
}

impl From<Option<i64>> for StatValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(StatValue::Missing, StatValue::Value)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Missing => f.write_str("-"),
            StatValue::Value(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Inkability {
    Inkable,
    Uninkable,
}

impl fmt::Display for Inkability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inkability::Inkable => f.write_str("Inkable"),
            Inkability::Uninkable => f.write_str("Uninkable"),
        }
    }
}

/// Label -> bucket mapping, iterated in label order
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution<K> {
    buckets: BTreeMap<K, Bucket>,
}

impl<K: Ord> Distribution<K> {
    fn from_counts(counts: BTreeMap<K, usize>, denominator: usize) -> Self {
        let buckets = counts
            .into_iter()
            .map(|(label, count)| {
                let bucket = Bucket {
                    count,
                    percentage: percentage(count, denominator),
                };
                (label, bucket)
            })
            .collect();
        Self { buckets }
    }

    pub fn get<Q>(&self, label: &Q) -> Option<&Bucket>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.buckets.get(label)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Bucket)> {
        self.buckets.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    /// Sum of all bucket counts
    pub fn total_count(&self) -> usize {
        self.buckets.values().map(|b| b.count).sum()
    }

    /// Buckets by descending count, ties in label order
    pub fn ranked(&self) -> Vec<(&K, &Bucket)> {
        let mut ranked: Vec<_> = self.buckets.iter().collect();
        ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
        ranked
    }
}

impl<K> Default for Distribution<K> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }
}

/// Serialized as a list of `{label, count, percentage}` entries so that
/// non-string labels survive JSON
impl<K: fmt::Display> Serialize for Distribution<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry {
            label: String,
            count: usize,
            percentage: f64,
        }

        let mut seq = serializer.serialize_seq(Some(self.buckets.len()))?;
        for (label, bucket) in &self.buckets {
            seq.serialize_element(&Entry {
                label: label.to_string(),
                count: bucket.count,
                percentage: bucket.percentage,
            })?;
        }
        seq.end()
    }
}

/// Statistics over a snapshot of cube members
pub struct CubeStats {
    cards: Vec<Card>,
}

impl CubeStats {
    /// Wrap a list of cube members. The cards are trusted to be in the cube.
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Snapshot the current cube from the store
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self::new(cube_cards(conn, None)?))
    }

    pub fn cube_size(&self) -> usize {
        self.cards.len()
    }

    pub fn character_count(&self) -> usize {
        self.characters().count()
    }

    fn characters(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|card| card.is_character())
    }

    fn count_by<'a, K, I, F>(cards: I, key: F) -> BTreeMap<K, usize>
    where
        K: Ord,
        I: Iterator<Item = &'a Card>,
        F: Fn(&Card) -> K,
    {
        let mut counts = BTreeMap::new();
        for card in cards {
            *counts.entry(key(card)).or_insert(0) += 1;
        }
        counts
    }

    /// Cards per raw color string ("Amber/Ruby" is its own bucket)
    pub fn by_color(&self) -> Distribution<String> {
        let counts = Self::count_by(self.cards.iter(), |card| blank_as_none(&card.color));
        Distribution::from_counts(counts, self.cube_size())
    }

    /// Like [`by_color`](Self::by_color) with every multi-ink color folded into `Multicolor`
    pub fn by_color_family(&self) -> Distribution<String> {
        let counts = Self::count_by(self.cards.iter(), |card| {
            if card.is_multicolor() {
                MULTICOLOR.to_string()
            } else {
                blank_as_none(&card.color)
            }
        });
        Distribution::from_counts(counts, self.cube_size())
    }

    /// Cards per stored type text; blank types count under `None`
    pub fn by_type(&self) -> Distribution<String> {
        let counts = Self::count_by(self.cards.iter(), |card| blank_as_none(&card.type_label));
        Distribution::from_counts(counts, self.cube_size())
    }

    /// Cost curve, ascending; cards without a cost sort first
    pub fn by_cost(&self) -> Distribution<StatValue> {
        let counts = Self::count_by(self.cards.iter(), |card| StatValue::from(card.cost));
        Distribution::from_counts(counts, self.cube_size())
    }

    /// Inkable vs uninkable. Both buckets are present for a non-empty cube.
    pub fn by_inkable(&self) -> Distribution<Inkability> {
        if self.cards.is_empty() {
            return Distribution::default();
        }
        let mut counts = BTreeMap::from([(Inkability::Inkable, 0), (Inkability::Uninkable, 0)]);
        for card in &self.cards {
            let key = if card.inkable {
                Inkability::Inkable
            } else {
                Inkability::Uninkable
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        Distribution::from_counts(counts, self.cube_size())
    }

    /// Strength over every cube member, as a share of the Character count.
    ///
    /// Non-characters land in the `Missing` bucket, so percentages can sum past 100.
    pub fn by_strength(&self) -> Distribution<StatValue> {
        let counts = Self::count_by(self.cards.iter(), |card| StatValue::from(card.strength));
        Distribution::from_counts(counts, self.character_count())
    }

    /// Willpower over every cube member, as a share of the Character count
    pub fn by_willpower(&self) -> Distribution<StatValue> {
        let counts = Self::count_by(self.cards.iter(), |card| StatValue::from(card.willpower));
        Distribution::from_counts(counts, self.character_count())
    }

    /// Lore over every cube member that has a lore value, as a share of the
    /// Character count. Locations with lore are included.
    pub fn by_lore(&self) -> Distribution<i64> {
        let counts = Self::count_by(self.cards.iter().filter(|card| card.lore.is_some()), |card| {
            card.lore.unwrap_or_default()
        });
        Distribution::from_counts(counts, self.character_count())
    }

    /// Classification tags of Character members.
    ///
    /// A card with three tags counts in three buckets. Known tags are seeded
    /// at zero, unknown tags get their own bucket, and zero buckets are dropped.
    pub fn by_classification(&self) -> Distribution<String> {
        let mut counts: BTreeMap<String, usize> = CLASSIFICATIONS
            .iter()
            .map(|tag| (tag.to_string(), 0))
            .collect();
        let mut unknown = BTreeSet::new();

        for card in self.characters() {
            for tag in card.classification_tags() {
                if !CLASSIFICATIONS.contains(&tag.as_str()) {
                    unknown.insert(tag.clone());
                }
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        for tag in &unknown {
            log::warn!("Unrecognized classification: {}", tag);
        }

        counts.retain(|_, count| *count > 0);
        Distribution::from_counts(counts, self.character_count())
    }

    /// Character members whose ability text mentions each keyword.
    ///
    /// Plain substring match: buckets are not mutually exclusive and a keyword
    /// appearing inside other text still counts. Zero buckets are omitted.
    pub fn by_keyword(&self) -> Distribution<String> {
        let abilities: Vec<String> = self
            .characters()
            .map(|card| card.abilities.as_deref().unwrap_or_default().to_lowercase())
            .collect();

        let counts: BTreeMap<String, usize> = KEYWORDS
            .iter()
            .map(|keyword| {
                let needle = keyword.to_lowercase();
                let count = abilities.iter().filter(|text| text.contains(&needle)).count();
                (keyword.to_string(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        Distribution::from_counts(counts, self.character_count())
    }

    /// Every statistic at once
    pub fn report(&self) -> CubeReport {
        CubeReport {
            cube_size: self.cube_size(),
            character_count: self.character_count(),
            color: self.by_color(),
            color_family: self.by_color_family(),
            card_type: self.by_type(),
            cost: self.by_cost(),
            inkable: self.by_inkable(),
            strength: self.by_strength(),
            willpower: self.by_willpower(),
            lore: self.by_lore(),
            classification: self.by_classification(),
            keyword: self.by_keyword(),
        }
    }
}

fn blank_as_none(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        NO_VALUE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Full statistics report for the cube
#[derive(Debug, Clone, Serialize)]
pub struct CubeReport {
    pub cube_size: usize,
    pub character_count: usize,
    pub color: Distribution<String>,
    pub color_family: Distribution<String>,
    pub card_type: Distribution<String>,
    pub cost: Distribution<StatValue>,
    pub inkable: Distribution<Inkability>,
    pub strength: Distribution<StatValue>,
    pub willpower: Distribution<StatValue>,
    pub lore: Distribution<i64>,
    pub classification: Distribution<String>,
    pub keyword: Distribution<String>,
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
