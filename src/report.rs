//! Plain-text rendering of cards, cube statistics and tournament results.

use crate::backup::ImportSummary;
use crate::models::Card;
use crate::stats::{Bucket, CubeReport, Distribution, StatValue};
use crate::tournament::{CardWinrate, ColorWinrate, Tournament, WinnerStats};
use std::fmt::Display;

/// One bar segment per this many percent
const BAR_STEP: f64 = 3.0;

fn bar(percentage: f64) -> String {
    "█".repeat((percentage / BAR_STEP) as usize)
}

/// Render a distribution as `label  count  pct%  bar` lines, in label order
pub fn format_distribution<K: Display + Ord>(title: &str, dist: &Distribution<K>) -> String {
    format_buckets(title, dist.iter())
}

/// Like [`format_distribution`], largest buckets first
pub fn format_ranked_distribution<K: Display + Ord>(title: &str, dist: &Distribution<K>) -> String {
    format_buckets(title, dist.ranked().into_iter())
}

fn format_buckets<'a, K: Display + 'a>(
    title: &str,
    buckets: impl Iterator<Item = (&'a K, &'a Bucket)>,
) -> String {
    let mut output = format!("{title}\n{}\n", "-".repeat(title.chars().count()));

    let rows: Vec<(String, &Bucket)> = buckets.map(|(l, b)| (l.to_string(), b)).collect();
    if rows.is_empty() {
        output.push_str("  (no data)\n");
        return output;
    }

    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    for (label, bucket) in &rows {
        output.push_str(&format!(
            "  {label:<width$}  {:>4}  {:>5.1}%  {}\n",
            bucket.count,
            bucket.percentage,
            bar(bucket.percentage)
        ));
    }
    output
}

/// Render every distribution of a cube report
pub fn format_cube_report(report: &CubeReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Cube: {} cards ({} characters)\n========================\n\n",
        report.cube_size, report.character_count
    ));

    let sections = [
        format_distribution("Ink", &report.color),
        format_distribution("Ink (mono/multi)", &report.color_family),
        format_distribution("Type", &report.card_type),
        format_distribution("Cost", &report.cost),
        format_distribution("Inkable", &report.inkable),
        format_distribution("Strength (% of characters)", &report.strength),
        format_distribution("Willpower (% of characters)", &report.willpower),
        format_distribution("Lore (% of characters)", &report.lore),
        format_ranked_distribution("Classifications", &report.classification),
        format_ranked_distribution("Keywords", &report.keyword),
    ];
    output.push_str(&sections.join("\n"));
    output
}

/// Render cards as an aligned table
pub fn format_card_table(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "No cards found.\n".to_string();
    }

    let id_len = cards.iter().map(|c| c.unique_id.len()).max().unwrap_or(0).max(2);
    let name_len = cards.iter().map(|c| c.name.chars().count()).max().unwrap_or(0).max(4);
    let type_len = cards
        .iter()
        .map(|c| c.type_label.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut output = format!(
        "{:<id_len$}  {:<name_len$}  {:<type_len$}  {:>4}  {:<6}  Ink\n",
        "ID", "Name", "Type", "Cost", "Cube"
    );
    for card in cards {
        output.push_str(&format!(
            "{:<id_len$}  {:<name_len$}  {:<type_len$}  {:>4}  {:<6}  {}\n",
            card.unique_id,
            card.name,
            card.type_label,
            StatValue::from(card.cost).to_string(),
            if card.in_cube { "yes" } else { "" },
            card.color
        ));
    }
    output.push_str(&format!("\n{} cards\n", cards.len()));
    output
}

pub fn format_tournaments(tournaments: &[Tournament]) -> String {
    if tournaments.is_empty() {
        return "No tournaments recorded.\n".to_string();
    }

    let mut output = String::new();
    for t in tournaments {
        output.push_str(&format!("#{} {} - {} ({})", t.id, t.date, t.winner_name, t.colors));
        if let Some(notes) = &t.notes {
            output.push_str(&format!(" - {notes}"));
        }
        output.push('\n');
    }
    output
}

pub fn format_card_winrates(rates: &[CardWinrate]) -> String {
    if rates.is_empty() {
        return "No tournament decks recorded.\n".to_string();
    }

    let name_len = rates.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    let mut output = String::from("Most winning cards\n------------------\n");
    for (rank, rate) in rates.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {:<name_len$}  {:>3} wins  [{}] {}\n",
            rank + 1,
            rate.name,
            rate.wins,
            rate.card_type.label(),
            rate.color
        ));
    }
    output
}

pub fn format_color_winrates(rates: &[ColorWinrate]) -> String {
    if rates.is_empty() {
        return "No tournaments recorded.\n".to_string();
    }

    let total: usize = rates.iter().map(|r| r.tournaments).sum();
    let mut output = String::from("Wins by ink\n-----------\n");
    for rate in rates {
        let pct = rate.tournaments as f64 / total as f64 * 100.0;
        output.push_str(&format!("  {}: {} ({:.1}%)\n", rate.colors, rate.tournaments, pct));
    }
    output
}

pub fn format_winner_stats(stats: &[WinnerStats]) -> String {
    if stats.is_empty() {
        return "No tournaments recorded.\n".to_string();
    }

    let mut output = String::from("Wins by player\n--------------\n");
    for s in stats {
        output.push_str(&format!(
            "  {}: {} {} ({})\n",
            s.winner_name,
            s.wins,
            if s.wins == 1 { "win" } else { "wins" },
            s.colors_used.join(", ")
        ));
    }
    output
}

pub fn format_import_summary(summary: &ImportSummary) -> String {
    let mut output = format!(
        "Imported {}/{} cards\n",
        summary.imported, summary.attempted
    );
    if !summary.not_found.is_empty() {
        output.push_str(&format!("Not found in catalog: {}\n", summary.not_found.join(", ")));
    }
    output
}
