//! Cube Manager - Lorcana cube membership and statistics
//!
//! Keeps a Lorcana card catalog in SQLite, tracks which cards belong to the
//! cube, computes distributions over the cube and records draft tournament
//! results played with it.

pub mod backup;
pub mod catalog;
pub mod database;
pub mod error;
pub mod membership;
pub mod models;
pub mod query;
pub mod report;
pub mod stats;
pub mod tournament;

pub use backup::{export_snapshot, import_snapshot, CubeSnapshot, ImportSummary};
pub use catalog::CatalogEntry;
pub use database::{open_database, upsert_cards};
pub use error::{CubeError, Result};
pub use membership::{add_to_cube, cube_cards, cube_size, remove_from_cube};
pub use models::{Card, CardType, Ink, SortKey};
pub use query::{filter_cards, search_by_effect, search_by_name, CardFilter};
pub use stats::{CubeReport, CubeStats, Distribution};
pub use tournament::{report_tournament, ColorIdentity, NewTournament, Tournament};
