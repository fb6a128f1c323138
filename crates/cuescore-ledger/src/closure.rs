//! Score closure: recomputing player scores from the turn history.
//!
//! A player's `score` is a cache. The closed form is:
//!
//! ```text
//! score(P) = sum(winner_gain(T)      for T in history if T.winner == P)
//!          - sum(points_per_loser(T) for T in history if P in T.losers)
//! ```
//!
//! [`recompute_scores`] evaluates that sum from zero by replaying the
//! history oldest-first; it backs `rewind_to`. [`verify_scores`] compares
//! the cached scores against it and is the audit run on every restored
//! snapshot. Because each turn is zero-sum, the table total must also be
//! zero.

use std::collections::BTreeMap;

use cuescore_types::{Player, PlayerId, Turn};

use crate::LedgerError;

/// The result of auditing cached scores against the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureResult {
    /// Every cached score equals its recomputed value.
    Consistent,
    /// At least one score disagrees with the history.
    Drift(ScoreDrift),
}

/// Details of a score-closure violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDrift {
    /// Per-player (`cached`, `recomputed`) for every player that disagrees.
    pub mismatches: BTreeMap<PlayerId, (i64, i64)>,
    /// Sum of all cached scores (zero when balanced).
    pub table_total: i64,
    /// Human-readable description.
    pub message: String,
}

impl core::fmt::Display for ScoreDrift {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Signed score changes produced by one turn: the winner's gain followed by
/// one `-points_per_loser` entry per loser.
///
/// # Errors
///
/// Returns [`LedgerError::ArithmeticOverflow`] if the gain does not fit.
pub fn turn_deltas(turn: &Turn) -> Result<Vec<(PlayerId, i64)>, LedgerError> {
    let gain = turn.winner_gain().ok_or(LedgerError::ArithmeticOverflow {
        context: "winner gain",
    })?;
    let penalty = i64::from(turn.points_per_loser);

    let mut deltas = Vec::with_capacity(turn.loser_ids.len().saturating_add(1));
    deltas.push((turn.winner_id, gain));
    deltas.extend(turn.loser_ids.iter().map(|id| (*id, penalty.saturating_neg())));
    Ok(deltas)
}

/// Add `deltas` to `scores`, failing on unknown players or overflow.
pub(crate) fn accumulate(
    scores: &mut BTreeMap<PlayerId, i64>,
    deltas: &[(PlayerId, i64)],
) -> Result<(), LedgerError> {
    for (id, delta) in deltas {
        let score = scores
            .get_mut(id)
            .ok_or_else(|| LedgerError::InconsistentSnapshot {
                reason: format!("turn references unseated player {id}"),
            })?;
        *score = score
            .checked_add(*delta)
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "player score",
            })?;
    }
    Ok(())
}

/// Recompute every seated player's score from zero by replaying `history`
/// (ordered newest-first) in chronological order.
///
/// # Errors
///
/// Returns [`LedgerError::InconsistentSnapshot`] if a turn references a
/// player who is not seated, or [`LedgerError::ArithmeticOverflow`].
pub fn recompute_scores(
    players: &[Player],
    history: &[Turn],
) -> Result<BTreeMap<PlayerId, i64>, LedgerError> {
    let mut scores: BTreeMap<PlayerId, i64> = players.iter().map(|p| (p.id, 0)).collect();
    for turn in history.iter().rev() {
        accumulate(&mut scores, &turn_deltas(turn)?)?;
    }
    Ok(scores)
}

/// Audit the cached scores of `players` against `history`.
pub fn verify_scores(players: &[Player], history: &[Turn]) -> ClosureResult {
    let expected = match recompute_scores(players, history) {
        Ok(scores) => scores,
        Err(e) => {
            return ClosureResult::Drift(ScoreDrift {
                mismatches: BTreeMap::new(),
                table_total: table_total(players),
                message: format!("SCORE_DRIFT: history cannot be replayed: {e}"),
            });
        }
    };

    let mismatches: BTreeMap<PlayerId, (i64, i64)> = players
        .iter()
        .filter_map(|p| {
            let recomputed = expected.get(&p.id).copied().unwrap_or(0);
            (p.score != recomputed).then_some((p.id, (p.score, recomputed)))
        })
        .collect();
    let total = table_total(players);

    if mismatches.is_empty() && total == 0 {
        ClosureResult::Consistent
    } else {
        let count = mismatches.len();
        ClosureResult::Drift(ScoreDrift {
            mismatches,
            table_total: total,
            message: format!(
                "SCORE_DRIFT: {count} player score(s) disagree with history, table total {total}",
            ),
        })
    }
}

fn table_total(players: &[Player]) -> i64 {
    players
        .iter()
        .fold(0_i64, |acc, p| acc.saturating_add(p.score))
}
