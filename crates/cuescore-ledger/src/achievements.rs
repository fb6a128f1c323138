//! Match achievements derived purely from the turn history.
//!
//! [`derive_achievements`] never mutates its input and holds no state, so
//! callers may invoke it on every render; caching the result is an
//! optimization, never a correctness requirement.
//!
//! Turns are scanned oldest-first, so "first seen" in the tie-break rules
//! below means "reached earliest in the match".

use cuescore_types::{Achievements, PlayerId, Turn};

/// Derive the two match statistics from `history` (newest first).
///
/// - **Top niner**: per turn holder, the sum of `nine_count x |losers|`
///   over their turns; the strict maximum wins, ties keep the player who
///   first potted a 9-ball.
/// - **Best turn**: the turn with the strict maximum winner gain
///   (`points_per_loser x |losers|`); ties keep the earlier turn.
///
/// An empty history, or one without any 9-ball or any positive gain,
/// yields the corresponding fields as `None` / zero.
pub fn derive_achievements(history: &[Turn]) -> Achievements {
    let mut nines: Vec<(PlayerId, u64)> = Vec::new();
    let mut best: Option<(&Turn, i64)> = None;

    for turn in history.iter().rev() {
        let credited = turn.nines_credited().unwrap_or(u64::MAX);
        if credited > 0 {
            match nines.iter_mut().find(|(id, _)| *id == turn.winner_id) {
                Some((_, total)) => *total = total.saturating_add(credited),
                None => nines.push((turn.winner_id, credited)),
            }
        }

        let gain = turn.winner_gain().unwrap_or(i64::MAX);
        if gain > best.map_or(0, |(_, g)| g) {
            best = Some((turn, gain));
        }
    }

    let top_niner = nines
        .iter()
        .fold(None::<(PlayerId, u64)>, |top, (id, count)| match top {
            Some((_, max)) if *count <= max => top,
            _ => Some((*id, *count)),
        });

    Achievements {
        top_niner_id: top_niner.map(|(id, _)| id),
        top_niner_count: top_niner.map_or(0, |(_, count)| count),
        best_turn_winner_id: best.map(|(turn, _)| turn.winner_id),
        best_turn_id: best.map(|(turn, _)| turn.id),
        best_turn_gain: best.map_or(0, |(_, gain)| gain),
    }
}
