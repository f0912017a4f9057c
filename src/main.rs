//! Cube Manager - command line front end
//!
//! Thin wrapper over the `cube_manager` library. All presentation choices
//! (sort key, filters, output format) are made here and passed in explicitly.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use cube_manager::backup::{default_backup_file_name, read_snapshot_file, write_snapshot_file};
use cube_manager::catalog::read_catalog_file;
use cube_manager::query::search_body_text;
use cube_manager::report::{
    format_card_table, format_card_winrates, format_color_winrates, format_cube_report,
    format_import_summary, format_tournaments, format_winner_stats,
};
use cube_manager::tournament::{
    all_tournaments, card_winrate, color_winrate, counted_deck_size, meets_minimum_deck_size,
    parse_deck_list, tournament_deck, winner_stats, MIN_DECK_SIZE,
};
use cube_manager::{
    add_to_cube, cube_cards, export_snapshot, filter_cards, import_snapshot, open_database,
    remove_from_cube, search_by_effect, search_by_name, upsert_cards, CardFilter, ColorIdentity,
    Card, CubeStats, NewTournament, SortKey,
};
use rusqlite::Connection;
use std::path::PathBuf;

/// Lorcana cube manager - curate a cube, inspect its statistics and track tournament winners
#[derive(Parser, Debug)]
#[command(name = "cube_manager")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(short, long, global = true, default_value_t = default_db_path())]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load or refresh the card catalog from a JSON file
    LoadCatalog {
        /// Catalog JSON (array of card records)
        file: PathBuf,
    },

    /// Add cards to the cube
    Add {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove cards from the cube
    Remove {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List the cube
    List {
        /// Sort by name, cost, color or type
        #[arg(short, long, default_value = "name", value_parser = parse_sort_key)]
        sort: SortKey,
    },

    /// Search cards by name, or by effect text with --effect
    Search {
        query: String,

        /// Match ability and body text instead of the name
        #[arg(long)]
        effect: bool,

        /// Only search cards in the cube
        #[arg(long)]
        cube_only: bool,
    },

    /// Filter the catalog by several criteria at once
    Filter {
        /// Substring of name, id, body text or classifications
        #[arg(long)]
        text: Option<String>,

        /// Ink (repeatable); matches cards with any of the given inks
        #[arg(long = "color")]
        colors: Vec<String>,

        /// Card type (repeatable), e.g. "Character" or "Action - Song"
        #[arg(long = "type")]
        types: Vec<String>,

        #[arg(long)]
        inkable: Option<bool>,

        #[arg(long)]
        in_cube: Option<bool>,
    },

    /// Show cube statistics
    Stats {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the body text of cube cards
    Text { query: String },

    /// Record a tournament winner and their deck
    ReportTournament {
        #[arg(long)]
        winner: String,

        /// 1 to 3 inks, e.g. "Amber/Ruby"
        #[arg(long)]
        colors: String,

        /// Tournament date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,

        /// Deck list file: one card id per line, optionally prefixed by a count
        #[arg(long)]
        deck_file: PathBuf,

        /// Record the deck even if it has fewer than the minimum number of cards
        #[arg(long)]
        skip_size_check: bool,
    },

    /// List recorded tournaments, newest first
    Tournaments,

    /// Show the winning deck of a tournament
    Deck { tournament_id: i64 },

    /// Show win statistics per card, ink and player
    Winrates,

    /// Export cube membership to a JSON snapshot
    Export {
        /// Output file (default: cube_backup_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import cube membership from a JSON snapshot
    Import {
        file: PathBuf,

        /// Add to the current cube instead of replacing it
        #[arg(long)]
        keep_existing: bool,
    },
}

/// Returns the default database path: ~/.local/share/cube_manager/lorcana_cards.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cube_manager")
        .join("lorcana_cards.db")
        .to_string_lossy()
        .to_string()
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    SortKey::parse(s)
        .ok_or_else(|| format!("unknown sort key '{s}' (use name, cost, color or type)"))
}

/// Message for a deck below the minimum; the free bonus card is not counted
fn deck_size_problem(cards: &[Card]) -> Option<String> {
    if meets_minimum_deck_size(cards) {
        return None;
    }
    Some(format!(
        "Deck has {} counted cards; at least {MIN_DECK_SIZE} are required",
        counted_deck_size(cards)
    ))
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("Database path: {}", cli.database);

    let mut conn = match open_database(&cli.database) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut conn, cli.command) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(conn: &mut Connection, command: Command) -> cube_manager::Result<()> {
    match command {
        Command::LoadCatalog { file } => {
            let entries = read_catalog_file(&file)?;
            let count = upsert_cards(conn, &entries)?;
            println!("Loaded {count} cards from {}", file.display());
        }

        Command::Add { ids } => {
            for id in &ids {
                add_to_cube(conn, id)?;
                println!("Added {id}");
            }
        }

        Command::Remove { ids } => {
            for id in &ids {
                remove_from_cube(conn, id)?;
                println!("Removed {id}");
            }
        }

        Command::List { sort } => {
            print!("{}", format_card_table(&cube_cards(conn, Some(sort))?));
        }

        Command::Search {
            query,
            effect,
            cube_only,
        } => {
            let cards = if effect {
                search_by_effect(conn, &query, cube_only)?
            } else {
                search_by_name(conn, &query, cube_only)?
            };
            print!("{}", format_card_table(&cards));
        }

        Command::Filter {
            text,
            colors,
            types,
            inkable,
            in_cube,
        } => {
            let mut filter = CardFilter::new();
            if let Some(text) = text {
                filter = filter.text(text);
            }
            if !colors.is_empty() {
                filter = filter.colors(colors);
            }
            if !types.is_empty() {
                filter = filter.types(types);
            }
            if let Some(inkable) = inkable {
                filter = filter.inkable(inkable);
            }
            if let Some(in_cube) = in_cube {
                filter = filter.in_cube(in_cube);
            }
            print!("{}", format_card_table(&filter_cards(conn, &filter)?));
        }

        Command::Stats { json } => {
            let report = CubeStats::load(conn)?.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", format_cube_report(&report));
            }
        }

        Command::Text { query } => {
            print!("{}", format_card_table(&search_body_text(conn, &query)?));
        }

        Command::ReportTournament {
            winner,
            colors,
            date,
            notes,
            deck_file,
            skip_size_check,
        } => {
            let deck = parse_deck_list(&std::fs::read_to_string(&deck_file)?);
            if !skip_size_check {
                let cards = deck
                    .iter()
                    .map(|id| cube_manager::database::get_card(conn, id))
                    .collect::<cube_manager::Result<Vec<_>>>()?;
                if let Some(message) = deck_size_problem(&cards) {
                    eprintln!("{message} (use --skip-size-check to record it anyway)");
                    std::process::exit(1);
                }
            }

            let tournament = NewTournament {
                winner_name: winner,
                colors: ColorIdentity::parse(&colors)?,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                notes,
                deck,
            };
            let id = cube_manager::report_tournament(conn, &tournament)?;
            println!(
                "Recorded tournament #{id}: {} with {} ({} cards)",
                tournament.winner_name,
                tournament.colors,
                tournament.deck.len()
            );
        }

        Command::Tournaments => {
            print!("{}", format_tournaments(&all_tournaments(conn)?));
        }

        Command::Deck { tournament_id } => {
            print!("{}", format_card_table(&tournament_deck(conn, tournament_id)?));
        }

        Command::Winrates => {
            print!("{}", format_card_winrates(&card_winrate(conn)?));
            println!();
            print!("{}", format_color_winrates(&color_winrate(conn)?));
            println!();
            print!("{}", format_winner_stats(&winner_stats(conn)?));
        }

        Command::Export { output } => {
            let snapshot = export_snapshot(conn)?;
            let path = output.unwrap_or_else(|| PathBuf::from(default_backup_file_name()));
            write_snapshot_file(&path, &snapshot)?;
            println!(
                "Exported {} cards to {}",
                snapshot.total_cards,
                path.display()
            );
        }

        Command::Import {
            file,
            keep_existing,
        } => {
            let snapshot = read_snapshot_file(&file)?;
            let summary = import_snapshot(conn, &snapshot, !keep_existing)?;
            print!("{}", format_import_summary(&summary));
        }
    }
    Ok(())
}
