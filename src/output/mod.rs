//! Turning ranking results into something a caller can show.

use colored::*;
use serde_json::{Value, json};

use crate::errors::RankingError;
use crate::ranking::{RankedEntry, RankingResult};

/// Wire representation of a ranking request's outcome. A failed request
/// becomes `{"error": "<message>"}`.
pub fn render_json(outcome: Result<&RankingResult, &RankingError>) -> Value {
    match outcome {
        Ok(result) => serde_json::to_value(result)
            .unwrap_or_else(|e| json!({ "error": format!("Failed to serialize ranking: {}", e) })),
        Err(error) => json!({ "error": error.to_string() }),
    }
}

/// Plain-text table of a ranking, one participant per line
pub fn render_table(result: &RankingResult) -> String {
    let meta = &result.meta;
    let show_played = meta.round_count > 1;
    let mut lines = Vec::with_capacity(result.entries.len() + 2);

    lines.push(format!(
        "{} ({} .. {}), max {:.0} points",
        meta.group_name.bold(),
        meta.from,
        meta.to,
        meta.points_max
    ));

    let mut header = format!("{:>4}  {:<24} {:>9} {:>7}", "#", "Player", "Points", "Diff");
    if show_played {
        header.push_str(&format!(" {:>6}", "Played"));
    }
    if meta.has_trend {
        header.push_str(&format!(" {:>6}", "Trend"));
    }
    lines.push(header.bright_black().to_string());

    for entry in &result.entries {
        lines.push(render_row(entry, show_played, meta.has_trend));
    }

    if result.entries.is_empty() {
        lines.push("No scores recorded in this window".italic().to_string());
    }

    lines.join("\n")
}

fn render_row(entry: &RankedEntry, show_played: bool, has_trend: bool) -> String {
    let mut row = format!(
        "{:>4}  {:<24} {:>9.1} {:>7.1}",
        entry.rank, entry.identity.display_name, entry.points, entry.points_diff
    );
    if show_played {
        row.push_str(&format!(" {:>6}", entry.played));
    }
    if has_trend {
        row.push_str(&format!(" {:>6}", trend_cell(entry.trend)));
    }
    row
}

fn trend_cell(trend: Option<i64>) -> ColoredString {
    match trend {
        Some(t) if t > 0 => format!("+{}", t).bright_blue(),
        Some(t) if t < 0 => t.to_string().yellow(),
        Some(_) => "0".bright_black(),
        None => "-".normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayIdentity;
    use crate::ranking::{RankingMeta, WindowLabels};

    fn entry(login: &str, rank: u32, points: f64, trend: Option<i64>) -> RankedEntry {
        RankedEntry {
            participant_id: rank as i64,
            login: login.to_string(),
            rank,
            points,
            played: 2,
            points_diff: 0.0,
            points_relative: 0.25,
            previous_rank: trend.map(|t| (rank as i64 + t) as u32),
            trend,
            identity: DisplayIdentity::fallback(login),
        }
    }

    fn result(has_trend: bool) -> RankingResult {
        RankingResult {
            meta: RankingMeta {
                has_trend,
                round_count: 2,
                points_max: 400.0,
                group_name: "Berlin".to_string(),
                from: "2018-10-20".to_string(),
                to: "2018-10-27".to_string(),
                labels: WindowLabels::default(),
                older: Some(17823),
                newer: None,
            },
            entries: vec![entry("moses", 1, 100.0, has_trend.then_some(2))],
        }
    }

    #[test]
    fn test_json_carries_entries_and_meta() {
        let value = render_json(Ok(&result(true)));

        assert_eq!(value["meta"]["group_name"], "Berlin");
        assert_eq!(value["meta"]["older"], 17823);
        assert_eq!(value["entries"][0]["rank"], 1);
        assert_eq!(value["entries"][0]["trend"], 2);
        assert_eq!(value["entries"][0]["display_name"], "moses");
    }

    #[test]
    fn test_json_omits_trend_without_previous_window() {
        let value = render_json(Ok(&result(false)));
        assert!(value["entries"][0].get("trend").is_none());
        assert!(value["entries"][0].get("previous_rank").is_none());
    }

    #[test]
    fn test_json_error_payload() {
        let value = render_json(Err(&RankingError::MissingWindow));
        assert_eq!(value, json!({ "error": "cannot rank: no round window given" }));
    }

    #[test]
    fn test_table_lists_every_entry() {
        let table = render_table(&result(true));

        assert!(table.contains("moses"));
        assert!(table.contains("100.0"));
        assert!(table.contains("Played"));
        assert!(table.contains("+2"));
    }
}
