//! Core entity structs for the score ledger.
//!
//! Covers `Player`, `PenaltyEvent`, `PenaltyRule`, `Turn`, the persisted
//! `LedgerSnapshot`, and the derived `Achievements` / `MatchSummary`
//! views handed to UI collaborators.
//!
//! Field names serialize in `camelCase` because the stored document and
//! the generated `TypeScript` bindings share one wire shape.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Tier;
use crate::ids::{PlayerId, TurnId};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A seated player and their running score.
///
/// `score` is a materialized view of the turn history: it always equals the
/// sum of the player's gains as turn holder minus their penalties as loser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Seat identifier, stable for the lifetime of a match.
    pub id: PlayerId,
    /// Display name, trimmed, at least two characters.
    pub name: String,
    /// Running score (may be negative).
    #[ts(type = "number")]
    pub score: i64,
}

impl Player {
    /// Create a player with a zero score.
    pub const fn new(id: PlayerId, name: String) -> Self {
        Self { id, name, score: 0 }
    }
}

// ---------------------------------------------------------------------------
// Penalty rules and events
// ---------------------------------------------------------------------------

/// The configured point value of one penalty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PenaltyRule {
    /// The ball tier this rule prices.
    #[ts(type = "3 | 6 | 9")]
    pub tier: Tier,
    /// Points each loser pays per ball of this tier.
    pub point_value: u32,
}

impl PenaltyRule {
    /// Create a rule for the given tier.
    pub const fn new(tier: Tier, point_value: u32) -> Self {
        Self { tier, point_value }
    }
}

/// "This many balls of this tier were potted in this turn."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PenaltyEvent {
    /// The ball tier potted.
    #[ts(type = "3 | 6 | 9")]
    pub tier: Tier,
    /// Number of balls of that tier (strictly positive).
    pub count: u32,
}

impl PenaltyEvent {
    /// Create an event for `count` balls of `tier`.
    pub const fn new(tier: Tier, count: u32) -> Self {
        Self { tier, count }
    }
}

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// One recorded scoring action in the ledger history.
///
/// `points_per_loser` is priced from the rule table when the turn is
/// recorded and frozen here; later rule edits never reprice history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Turn {
    /// Unique turn identifier.
    pub id: TurnId,
    /// The turn holder who potted the balls.
    pub winner_id: PlayerId,
    /// Players penalized by this turn (non-empty, excludes the winner).
    pub loser_ids: Vec<PlayerId>,
    /// Potted-ball events, at most one per tier.
    pub events: Vec<PenaltyEvent>,
    /// Points deducted from each loser.
    pub points_per_loser: u32,
    /// Milliseconds since the Unix epoch, non-decreasing across the history.
    #[ts(type = "number")]
    pub created_at: i64,
}

impl Turn {
    /// Points credited to the turn holder: `points_per_loser` paid by every
    /// loser. Every turn is therefore zero-sum across the table.
    ///
    /// Returns `None` on arithmetic overflow.
    pub fn winner_gain(&self) -> Option<i64> {
        let losers = i64::try_from(self.loser_ids.len()).ok()?;
        i64::from(self.points_per_loser).checked_mul(losers)
    }

    /// Number of balls of `tier` potted in this turn (zero if absent).
    pub fn count_of(&self, tier: Tier) -> u32 {
        self.events
            .iter()
            .find(|e| e.tier == tier)
            .map_or(0, |e| e.count)
    }

    /// Number of 9-balls credited to the winner: each potted 9-ball counts
    /// once per penalized loser. Returns `None` on arithmetic overflow.
    pub fn nines_credited(&self) -> Option<u64> {
        let losers = u64::try_from(self.loser_ids.len()).ok()?;
        u64::from(self.count_of(Tier::Nine)).checked_mul(losers)
    }
}

// ---------------------------------------------------------------------------
// Ledger snapshot (persisted body)
// ---------------------------------------------------------------------------

/// Full serializable state of a score ledger.
///
/// `history` is ordered most-recent-first. `active_turn_holder_id` is
/// stored as `0` when no match is in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LedgerSnapshot {
    /// Seated players, in seat order.
    pub players: Vec<Player>,
    /// The player whose turn it is, if a match is in progress.
    #[serde(with = "holder_id")]
    #[ts(type = "number")]
    pub active_turn_holder_id: Option<PlayerId>,
    /// Round counter, starting at 1.
    pub round: u32,
    /// Recorded turns, newest first.
    pub history: Vec<Turn>,
    /// Rule table, one entry per tier in ascending tier order.
    pub rules: Vec<PenaltyRule>,
}

/// Serializes an optional turn holder as a bare integer with `0` for none.
mod holder_id {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::ids::PlayerId;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(id: &Option<PlayerId>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(id.map_or(0, PlayerId::get))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PlayerId>, D::Error> {
        let raw = u32::deserialize(d)?;
        Ok((raw != 0).then_some(PlayerId(raw)))
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Statistics derived by scanning the full turn history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Achievements {
    /// Player credited with the most 9-balls, if any were potted.
    pub top_niner_id: Option<PlayerId>,
    /// 9-balls credited to the top niner (count x losers, summed).
    #[ts(type = "number")]
    pub top_niner_count: u64,
    /// Player who recorded the largest single-turn gain.
    pub best_turn_winner_id: Option<PlayerId>,
    /// The turn with the largest gain.
    pub best_turn_id: Option<TurnId>,
    /// Gain of that turn.
    #[ts(type = "number")]
    pub best_turn_gain: i64,
}

/// End-of-match summary: ranked standings plus the champion's highlights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MatchSummary {
    /// Players sorted by score, highest first; ties keep seat order.
    pub standings: Vec<Player>,
    /// The leading player, if anyone is seated.
    pub champion_id: Option<PlayerId>,
    /// 9-balls potted by the champion as turn holder.
    #[ts(type = "number")]
    pub champion_nines: u64,
    /// The champion's best single-turn gain.
    #[ts(type = "number")]
    pub champion_best_gain: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(losers: &[u32], events: Vec<PenaltyEvent>, points: u32) -> Turn {
        Turn {
            id: TurnId::new(),
            winner_id: PlayerId(1),
            loser_ids: losers.iter().copied().map(PlayerId).collect(),
            events,
            points_per_loser: points,
            created_at: 0,
        }
    }

    #[test]
    fn winner_gain_multiplies_by_loser_count() {
        let t = turn(&[2, 3], vec![PenaltyEvent::new(Tier::Nine, 1)], 3);
        assert_eq!(t.winner_gain(), Some(6));
    }

    #[test]
    fn nines_credited_counts_once_per_loser() {
        let t = turn(
            &[2, 3, 4],
            vec![
                PenaltyEvent::new(Tier::Three, 1),
                PenaltyEvent::new(Tier::Nine, 2),
            ],
            7,
        );
        assert_eq!(t.nines_credited(), Some(6));
        assert_eq!(t.count_of(Tier::Six), 0);
    }

    #[test]
    fn snapshot_uses_camel_case_and_zero_holder() {
        let snapshot = LedgerSnapshot {
            players: Vec::new(),
            active_turn_holder_id: None,
            round: 1,
            history: Vec::new(),
            rules: vec![PenaltyRule::new(Tier::Three, 1)],
        };
        let json = serde_json::to_value(&snapshot).ok();
        assert!(json.is_some());
        if let Some(value) = json {
            assert_eq!(value["activeTurnHolderId"], serde_json::json!(0));
            assert_eq!(value["rules"][0]["pointValue"], serde_json::json!(1));
            assert_eq!(value["rules"][0]["tier"], serde_json::json!(3));
        }
    }

    #[test]
    fn snapshot_round_trips_holder() {
        let json = r#"{"players":[],"activeTurnHolderId":2,"round":1,"history":[],"rules":[]}"#;
        let parsed: Result<LedgerSnapshot, _> = serde_json::from_str(json);
        assert!(parsed.is_ok());
        assert_eq!(
            parsed.ok().and_then(|s| s.active_turn_holder_id),
            Some(PlayerId(2))
        );
    }
}
