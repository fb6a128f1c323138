//! End-of-match standings and history labels.

use cuescore_types::{MatchSummary, PenaltyEvent, Player, Tier, Turn};

/// Rank the table and collect the champion's highlights.
///
/// Standings are sorted by score, highest first; the sort is stable so tied
/// players keep seat order. The champion is the first of the standings.
/// Their 9-ball total and best gain come from the turns they held.
pub fn summarize(players: &[Player], history: &[Turn]) -> MatchSummary {
    let mut standings = players.to_vec();
    standings.sort_by(|a, b| b.score.cmp(&a.score));

    let Some(champion) = standings.first().map(|p| p.id) else {
        return MatchSummary::default();
    };

    let held = || history.iter().filter(move |t| t.winner_id == champion);
    let champion_nines = held().fold(0_u64, |acc, t| {
        acc.saturating_add(u64::from(t.count_of(Tier::Nine)))
    });
    let champion_best_gain = held()
        .filter_map(Turn::winner_gain)
        .max()
        .unwrap_or(0)
        .max(0);

    MatchSummary {
        standings,
        champion_id: Some(champion),
        champion_nines,
        champion_best_gain,
    }
}

/// Compact label for a turn's events, e.g. `"9-ball x1, 3-ball x2"`.
///
/// Returns an empty string for an empty list.
pub fn render_events(events: &[PenaltyEvent]) -> String {
    events
        .iter()
        .map(|e| format!("{} x{}", e.tier, e.count))
        .collect::<Vec<_>>()
        .join(", ")
}
