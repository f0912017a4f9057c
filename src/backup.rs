//! Membership snapshots: export the cube as a list of card ids and restore it.
//!
//! A snapshot carries membership only. Importing never touches catalog data.

use crate::error::{CubeError, Result};
use crate::membership::cube_card_ids;
use chrono::Local;
use rusqlite::{params, Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized cube membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeSnapshot {
    /// ISO-8601 timestamp of the export
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub total_cards: usize,
    pub card_ids: Vec<String>,
}

impl CubeSnapshot {
    /// Parse a snapshot document. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CubeError::MalformedSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of [`import_snapshot`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Ids that matched a catalog card and are now in the cube
    pub imported: usize,
    /// Number of ids in the snapshot
    pub attempted: usize,
    /// Ids with no catalog card, in snapshot order
    pub not_found: Vec<String>,
}

/// Snapshot the current cube membership, ids ordered by card name
pub fn export_snapshot(conn: &Connection) -> Result<CubeSnapshot> {
    let card_ids = cube_card_ids(conn)?;
    log::debug!("Exporting {} cube cards", card_ids.len());
    Ok(CubeSnapshot {
        export_date: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        total_cards: card_ids.len(),
        card_ids,
    })
}

/// Restore membership from a snapshot.
///
/// With `clear_existing` every card leaves the cube first. Ids missing from
/// the catalog are skipped and reported in the summary. The whole import runs
/// in one transaction.
pub fn import_snapshot(
    conn: &mut Connection,
    snapshot: &CubeSnapshot,
    clear_existing: bool,
) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    let summary = import_snapshot_tx(&tx, snapshot, clear_existing)?;
    tx.commit()?;

    if !summary.not_found.is_empty() {
        log::warn!(
            "{} snapshot ids not in catalog: {}",
            summary.not_found.len(),
            summary.not_found.join(", ")
        );
    }
    log::info!(
        "Imported {}/{} cards into cube",
        summary.imported,
        summary.attempted
    );
    Ok(summary)
}

fn import_snapshot_tx(
    tx: &Transaction<'_>,
    snapshot: &CubeSnapshot,
    clear_existing: bool,
) -> Result<ImportSummary> {
    if clear_existing {
        let cleared = tx.execute("UPDATE cards SET in_cube = 0 WHERE in_cube = 1", [])?;
        log::debug!("Cleared {} cards from cube before import", cleared);
    }

    let mut summary = ImportSummary {
        attempted: snapshot.card_ids.len(),
        ..Default::default()
    };
    let mut stmt = tx.prepare_cached("UPDATE cards SET in_cube = 1 WHERE unique_id = ?1")?;
    for id in &snapshot.card_ids {
        if stmt.execute(params![id.trim()])? > 0 {
            summary.imported += 1;
        } else {
            summary.not_found.push(id.clone());
        }
    }
    Ok(summary)
}

/// Default file name for a new export, e.g. `cube_backup_20250301_184512.json`
pub fn default_backup_file_name() -> String {
    format!("cube_backup_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write a snapshot as pretty-printed JSON, creating parent directories
pub fn write_snapshot_file<P: AsRef<Path>>(path: P, snapshot: &CubeSnapshot) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, snapshot.to_json()?)?;
    log::info!(
        "Wrote snapshot of {} cards to {}",
        snapshot.card_ids.len(),
        path.display()
    );
    Ok(())
}

/// Read and parse a snapshot file
pub fn read_snapshot_file<P: AsRef<Path>>(path: P) -> Result<CubeSnapshot> {
    let content = std::fs::read_to_string(path.as_ref())?;
    CubeSnapshot::from_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::*;
    use crate::membership::{add_to_cube, cube_size};

    fn catalog_db() -> Connection {
        seeded_db(&[
            entry("TFC-001", "Ariel", "Amber"),
            entry("TFC-107", "Maleficent", "Amethyst"),
            entry("TFC-189", "Simba", "Ruby"),
        ])
    }

    fn snapshot(ids: &[&str]) -> CubeSnapshot {
        CubeSnapshot {
            export_date: "2025-03-01T18:45:12".to_string(),
            total_cards: ids.len(),
            card_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn export_lists_members_by_name() {
        let conn = catalog_db();
        add_to_cube(&conn, "TFC-189").unwrap();
        add_to_cube(&conn, "TFC-001").unwrap();

        let snap = export_snapshot(&conn).unwrap();
        assert_eq!(snap.total_cards, 2);
        assert_eq!(snap.card_ids, vec!["TFC-001", "TFC-189"]);
        assert!(
            chrono::NaiveDateTime::parse_from_str(&snap.export_date, "%Y-%m-%dT%H:%M:%S").is_ok()
        );
    }

    #[test]
    fn import_with_clear_replaces_membership() {
        let mut conn = catalog_db();
        add_to_cube(&conn, "TFC-107").unwrap();

        let summary = import_snapshot(&mut conn, &snapshot(&["TFC-001", "TFC-189"]), true).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.attempted, 2);
        assert!(summary.not_found.is_empty());
        assert_eq!(cube_card_ids(&conn).unwrap(), vec!["TFC-001", "TFC-189"]);
    }

    #[test]
    fn import_without_clear_merges() {
        let mut conn = catalog_db();
        add_to_cube(&conn, "TFC-107").unwrap();

        import_snapshot(&mut conn, &snapshot(&["TFC-001"]), false).unwrap();
        assert_eq!(cube_size(&conn).unwrap(), 2);
    }

    #[test]
    fn import_reports_unknown_ids() {
        let mut conn = catalog_db();
        let summary =
            import_snapshot(&mut conn, &snapshot(&["TFC-001", "NOPE-1", "NOPE-2"]), true).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.not_found, vec!["NOPE-1", "NOPE-2"]);
        assert_eq!(cube_size(&conn).unwrap(), 1);
    }

    #[test]
    fn import_empty_snapshot_with_clear_empties_cube() {
        let mut conn = catalog_db();
        add_to_cube(&conn, "TFC-001").unwrap();

        let summary = import_snapshot(&mut conn, &snapshot(&[]), true).unwrap();
        assert_eq!(summary, ImportSummary::default());
        assert_eq!(cube_size(&conn).unwrap(), 0);
    }

    #[test]
    fn from_json_ignores_unknown_fields() {
        let snap = CubeSnapshot::from_json(
            r#"{"export_date": "2025-01-01T00:00:00", "total_cards": 1,
                "card_ids": ["TFC-001"], "app_version": "2.1"}"#,
        )
        .unwrap();
        assert_eq!(snap.card_ids, vec!["TFC-001"]);
    }

    #[test]
    fn from_json_only_needs_card_ids() {
        let snap = CubeSnapshot::from_json(r#"{"card_ids": []}"#).unwrap();
        assert_eq!(snap.total_cards, 0);
        assert!(snap.export_date.is_empty());
    }

    #[test]
    fn from_json_rejects_missing_card_ids() {
        let err = CubeSnapshot::from_json(r#"{"export_date": "x", "total_cards": 3}"#).unwrap_err();
        assert!(matches!(err, CubeError::MalformedSnapshot(_)));
    }

    #[test]
    fn from_json_rejects_invalid_json() {
        assert!(matches!(
            CubeSnapshot::from_json("not json").unwrap_err(),
            CubeError::MalformedSnapshot(_)
        ));
    }

    #[test]
    fn default_file_name_shape() {
        let name = default_backup_file_name();
        assert!(name.starts_with("cube_backup_"));
        assert!(name.ends_with(".json"));
        // cube_backup_ + YYYYMMDD_HHMMSS + .json
        assert_eq!(name.len(), "cube_backup_".len() + 15 + ".json".len());
    }
}
