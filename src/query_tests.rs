//! Tests for card search and filtering.

use super::*;
use crate::database::test_support::*;
use crate::models::CardType;

fn names(cards: &[Card]) -> Vec<&str> {
    cards.iter().map(|c| c.name.as_str()).collect()
}

/// Small catalog covering every predicate:
/// - Elsa: Amethyst/Steel character, inkable, in cube, Evasive
/// - Elsa's Ice Palace: Amethyst location, not inkable
/// - Fire the Cannons: Ruby action, inkable, in cube
/// - Lantern: Steel item, deals "damage" in body text
fn search_db() -> Connection {
    let mut elsa = entry("TFC-042", "Elsa - Snow Queen", "Amethyst/Steel");
    elsa.abilities = Some("Evasive".to_string());
    elsa.body_text = Some("Freeze: Exert chosen opposing character.".to_string());
    elsa.classifications = Some("Floodborn, Hero, Queen, Sorcerer".to_string());

    let mut palace = entry("URR-170", "Elsa's Ice Palace", "Amethyst");
    palace.card_type = "Location".to_string();
    palace.inkable = false;
    palace.body_text = Some("Characters here get +1 willpower.".to_string());

    let mut cannons = entry("TFC-197", "Fire the Cannons!", "Ruby");
    cannons.card_type = "Action".to_string();
    cannons.body_text = Some("Deal 2 damage to chosen character.".to_string());

    let mut lantern = entry("TFC-100", "Lantern", "Steel");
    lantern.card_type = "Item".to_string();
    lantern.abilities = Some("Birthday Lights".to_string());
    lantern.body_text =
        Some("You pay 1 less for the next character you play. 100% off".to_string());

    let conn = seeded_db(&[elsa, palace, cannons, lantern]);
    set_in_cube(&conn, "TFC-042");
    set_in_cube(&conn, "TFC-197");
    conn
}

// ── search_by_name ───────────────────────────────────────────────────

#[test]
fn search_by_name_is_case_insensitive() {
    let conn = search_db();
    let cards = search_by_name(&conn, "eLSa", false).unwrap();
    assert_eq!(names(&cards), vec!["Elsa - Snow Queen", "Elsa's Ice Palace"]);
}

#[test]
fn search_by_name_cube_only() {
    let conn = search_db();
    let cards = search_by_name(&conn, "elsa", true).unwrap();
    assert_eq!(names(&cards), vec!["Elsa - Snow Queen"]);
}

#[test]
fn search_by_name_empty_query_matches_everything() {
    let conn = search_db();
    assert_eq!(search_by_name(&conn, "", false).unwrap().len(), 4);
    assert_eq!(search_by_name(&conn, "", true).unwrap().len(), 2);
}

#[test]
fn search_by_name_no_match() {
    let conn = search_db();
    assert!(search_by_name(&conn, "Stitch", false).unwrap().is_empty());
}

// ── search_by_effect ─────────────────────────────────────────────────

#[test]
fn search_by_effect_matches_body_text() {
    let conn = search_db();
    let cards = search_by_effect(&conn, "DAMAGE", false).unwrap();
    assert_eq!(names(&cards), vec!["Fire the Cannons!"]);
}

#[test]
fn search_by_effect_matches_ability_text() {
    let conn = search_db();
    let cards = search_by_effect(&conn, "evasive", false).unwrap();
    assert_eq!(names(&cards), vec!["Elsa - Snow Queen"]);

    let cards = search_by_effect(&conn, "birthday", false).unwrap();
    assert_eq!(names(&cards), vec!["Lantern"]);
}

#[test]
fn search_by_effect_cube_only() {
    let conn = search_db();
    let all = search_by_effect(&conn, "character", false).unwrap();
    assert_eq!(all.len(), 4);
    let in_cube = search_by_effect(&conn, "character", true).unwrap();
    assert_eq!(names(&in_cube), vec!["Elsa - Snow Queen", "Fire the Cannons!"]);
}

#[test]
fn search_by_effect_treats_percent_literally() {
    let conn = search_db();
    let cards = search_by_effect(&conn, "100%", false).unwrap();
    assert_eq!(names(&cards), vec!["Lantern"]);
    assert!(search_by_effect(&conn, "%%%x", false).unwrap().is_empty());
}

// ── search_body_text ─────────────────────────────────────────────────

#[test]
fn search_body_text_only_searches_cube() {
    let conn = search_db();
    let cards = search_body_text(&conn, "chosen").unwrap();
    assert_eq!(names(&cards), vec!["Elsa - Snow Queen", "Fire the Cannons!"]);
}

#[test]
fn search_body_text_blank_returns_nothing() {
    let conn = search_db();
    assert!(search_body_text(&conn, "   ").unwrap().is_empty());
}

// ── filter_cards ─────────────────────────────────────────────────────

#[test]
fn empty_filter_passes_everything() {
    let conn = search_db();
    assert_eq!(filter_cards(&conn, &CardFilter::new()).unwrap().len(), 4);
}

#[test]
fn text_filter_matches_id_body_or_classification() {
    let conn = search_db();

    let by_id = filter_cards(&conn, &CardFilter::new().text("urr-170")).unwrap();
    assert_eq!(names(&by_id), vec!["Elsa's Ice Palace"]);

    let by_body = filter_cards(&conn, &CardFilter::new().text("willpower")).unwrap();
    assert_eq!(names(&by_body), vec!["Elsa's Ice Palace"]);

    let by_class = filter_cards(&conn, &CardFilter::new().text("sorcerer")).unwrap();
    assert_eq!(names(&by_class), vec!["Elsa - Snow Queen"]);
}

#[test]
fn text_filter_does_not_search_abilities() {
    let conn = search_db();
    assert!(filter_cards(&conn, &CardFilter::new().text("Birthday"))
        .unwrap()
        .is_empty());
}

#[test]
fn color_filter_intersects_ink_tokens() {
    let conn = search_db();
    let steel = filter_cards(&conn, &CardFilter::new().colors(["steel"])).unwrap();
    assert_eq!(names(&steel), vec!["Elsa - Snow Queen", "Lantern"]);

    let ruby_or_amethyst =
        filter_cards(&conn, &CardFilter::new().colors(["Ruby", "Amethyst"])).unwrap();
    assert_eq!(
        names(&ruby_or_amethyst),
        vec!["Elsa - Snow Queen", "Elsa's Ice Palace", "Fire the Cannons!"]
    );
}

#[test]
fn type_filter_is_exact_and_case_insensitive() {
    let conn = search_db();
    let items = filter_cards(&conn, &CardFilter::new().types(["item", "LOCATION"])).unwrap();
    assert_eq!(names(&items), vec!["Elsa's Ice Palace", "Lantern"]);

    assert!(filter_cards(&conn, &CardFilter::new().types(["Char"]))
        .unwrap()
        .is_empty());
}

#[test]
fn type_filter_compares_stored_text() {
    let mut song = entry("TFC-025", "Friends Like Me", "Amber");
    song.card_type = "Action-Song".to_string();
    let conn = seeded_db(&[song]);

    let stored = filter_cards(&conn, &CardFilter::new().types(["action-song"])).unwrap();
    assert_eq!(names(&stored), vec!["Friends Like Me"]);
    assert_eq!(stored[0].card_type, CardType::ActionSong);

    let respelled = filter_cards(&conn, &CardFilter::new().types(["Action - Song"])).unwrap();
    assert!(respelled.is_empty());
}

#[test]
fn boolean_filters() {
    let conn = search_db();
    let uninkable = filter_cards(&conn, &CardFilter::new().inkable(false)).unwrap();
    assert_eq!(names(&uninkable), vec!["Elsa's Ice Palace"]);

    let outside = filter_cards(&conn, &CardFilter::new().in_cube(false)).unwrap();
    assert_eq!(names(&outside), vec!["Elsa's Ice Palace", "Lantern"]);
}

#[test]
fn predicates_are_anded() {
    let conn = search_db();
    let filter = CardFilter::new()
        .text("elsa")
        .colors(["Amethyst"])
        .in_cube(true)
        .inkable(true);
    let cards = filter_cards(&conn, &filter).unwrap();
    assert_eq!(names(&cards), vec!["Elsa - Snow Queen"]);
    assert_eq!(cards[0].card_type, CardType::Character);

    let none = filter_cards(&conn, &filter.clone().types(["Item"])).unwrap();
    assert!(none.is_empty());
}
