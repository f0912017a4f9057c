use chrono::NaiveDate;
use cube_manager::catalog::read_catalog_file;
use cube_manager::membership::cube_card_ids;
use cube_manager::tournament::{card_winrate, color_winrate, tournament_deck};
use cube_manager::{
    add_to_cube, cube_size, export_snapshot, import_snapshot, open_database, remove_from_cube,
    report_tournament, upsert_cards, ColorIdentity, CubeError, CubeStats, NewTournament,
};
use rusqlite::Connection;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// Test fixtures

fn sample_catalog() -> &'static str {
    r#"[
  {"Unique_ID": "TFC-001", "Name": "Ariel - On Human Legs", "Type": "Character",
   "Color": "Amber", "Cost": 4, "Inkable": true, "Strength": 3, "Willpower": 4, "Lore": 2,
   "Classifications": "Storyborn, Hero, Princess", "Abilities": "Voiceless"},
  {"Unique_ID": "TFC-042", "Name": "Elsa - Spirit of Winter", "Type": "Character",
   "Color": "Amber/Ruby", "Cost": 8, "Inkable": false, "Strength": 4, "Willpower": 6, "Lore": 3,
   "Classifications": ["Floodborn", "Hero", "Queen", "Sorcerer"], "Abilities": "Shift 6"},
  {"Unique_ID": "TFC-185", "Name": "Cogsworth - Talking Clock", "Type": "Character",
   "Color": "Steel", "Cost": 5, "Inkable": true, "Strength": 2, "Willpower": 5, "Lore": 2,
   "Classifications": "Storyborn, Ally"},
  {"Unique_ID": "TFC-197", "Name": "Fire the Cannons!", "Type": "Action",
   "Color": "Ruby", "Cost": 1, "Inkable": true, "Body_Text": "Deal 2 damage to chosen character."}
]"#
}

fn open_with_catalog() -> (TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_database(dir.path().join("cards.db")).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", sample_catalog()).unwrap();
    let entries = read_catalog_file(file.path()).unwrap();
    upsert_cards(&mut conn, &entries).unwrap();

    (dir, conn)
}

#[test]
fn test_three_single_cards_split_color_evenly() {
    let (_dir, conn) = open_with_catalog();
    for id in ["TFC-001", "TFC-042", "TFC-185"] {
        add_to_cube(&conn, id).unwrap();
    }

    let by_color = CubeStats::load(&conn).unwrap().by_color();
    assert_eq!(by_color.len(), 3);
    for label in ["Amber", "Amber/Ruby", "Steel"] {
        let bucket = by_color.get(label).unwrap();
        assert_eq!(bucket.count, 1);
        assert!((bucket.percentage - 33.333).abs() < 0.01);
    }
    assert_eq!(by_color.total_count(), cube_size(&conn).unwrap());
}

#[test]
fn test_empty_cube_has_empty_color_distribution() {
    let (_dir, conn) = open_with_catalog();
    let stats = CubeStats::load(&conn).unwrap();
    assert!(stats.by_color().is_empty());
    assert!(stats.by_classification().is_empty());
}

#[test]
fn test_add_then_remove_restores_size() {
    let (_dir, conn) = open_with_catalog();
    add_to_cube(&conn, "TFC-001").unwrap();
    let before = cube_size(&conn).unwrap();

    add_to_cube(&conn, "TFC-197").unwrap();
    remove_from_cube(&conn, "TFC-197").unwrap();
    assert_eq!(cube_size(&conn).unwrap(), before);
}

#[test]
fn test_membership_errors_leave_cube_unchanged() {
    let (_dir, conn) = open_with_catalog();
    add_to_cube(&conn, "TFC-001").unwrap();

    assert!(matches!(
        add_to_cube(&conn, "TFC-001"),
        Err(CubeError::AlreadyMember(_))
    ));
    assert!(matches!(
        remove_from_cube(&conn, "TFC-185"),
        Err(CubeError::NotMember(_))
    ));
    assert!(matches!(add_to_cube(&conn, "XXX-000"), Err(CubeError::NotFound(_))));
    assert_eq!(cube_size(&conn).unwrap(), 1);
}

#[test]
fn test_catalog_reload_keeps_membership() {
    let (_dir, mut conn) = open_with_catalog();
    add_to_cube(&conn, "TFC-042").unwrap();

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", sample_catalog()).unwrap();
    let entries = read_catalog_file(file.path()).unwrap();
    upsert_cards(&mut conn, &entries).unwrap();

    assert_eq!(cube_card_ids(&conn).unwrap(), vec!["TFC-042"]);
}

#[test]
fn test_list_classifications_are_counted() {
    let (_dir, conn) = open_with_catalog();
    add_to_cube(&conn, "TFC-042").unwrap();

    let classes = CubeStats::load(&conn).unwrap().by_classification();
    assert_eq!(classes.get("Queen").unwrap().count, 1);
    assert!(classes.iter().all(|(_, bucket)| bucket.count > 0));
}

#[test]
fn test_export_import_round_trip() {
    let (_dir, mut conn) = open_with_catalog();
    for id in ["TFC-001", "TFC-197"] {
        add_to_cube(&conn, id).unwrap();
    }
    let snapshot = export_snapshot(&conn).unwrap();

    remove_from_cube(&conn, "TFC-001").unwrap();
    add_to_cube(&conn, "TFC-185").unwrap();

    let summary = import_snapshot(&mut conn, &snapshot, true).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(cube_card_ids(&conn).unwrap(), snapshot.card_ids);
}

#[test]
fn test_tournament_duplicates_and_color_grouping() {
    let (_dir, mut conn) = open_with_catalog();
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    let first = report_tournament(
        &mut conn,
        &NewTournament {
            winner_name: "Mara".to_string(),
            colors: ColorIdentity::parse("Amber/Ruby").unwrap(),
            date,
            notes: None,
            deck: vec![
                "TFC-001".to_string(),
                "TFC-001".to_string(),
                "TFC-197".to_string(),
            ],
        },
    )
    .unwrap();
    report_tournament(
        &mut conn,
        &NewTournament {
            winner_name: "Jon".to_string(),
            colors: ColorIdentity::parse("Ruby/Amber").unwrap(),
            date,
            notes: Some("Top 8".to_string()),
            deck: vec!["TFC-197".to_string()],
        },
    )
    .unwrap();

    assert_eq!(tournament_deck(&conn, first).unwrap().len(), 3);

    let colors = color_winrate(&conn).unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].colors, "Amber/Ruby");
    assert_eq!(colors[0].tournaments, 2);

    let cards = card_winrate(&conn).unwrap();
    let ariel = cards.iter().find(|c| c.unique_id == "TFC-001").unwrap();
    assert_eq!(ariel.wins, 2);
}

#[test]
fn test_reopen_keeps_data() {
    let (dir, conn) = open_with_catalog();
    add_to_cube(&conn, "TFC-001").unwrap();
    drop(conn);

    let conn = open_database(dir.path().join("cards.db")).unwrap();
    assert_eq!(cube_size(&conn).unwrap(), 1);
}
