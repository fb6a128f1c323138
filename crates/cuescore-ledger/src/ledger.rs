//! The score ledger: players, turn holder, rule table, and turn history.
//!
//! The [`ScoreLedger`] is the in-memory source of truth for one match
//! session. Every command validates first and mutates second, so a command
//! that returns an error leaves the ledger untouched.
//!
//! # Design
//!
//! - **Newest-first history**: `apply_penalty` prepends; `undo_last` and
//!   `rewind_to` remove from the front.
//! - **Frozen pricing**: a turn's `points_per_loser` never changes after it
//!   is recorded, whatever happens to the rule table.
//! - **Score closure**: cached scores always equal the replay of the history
//!   (see [`crate::closure`]).
//!
//! # States
//!
//! | State | Condition | Entered by |
//! |-------|-----------|------------|
//! | Idle | no players seated | `new`, `reset_all` |
//! | `InMatch` | 3 or 4 players seated | `start_match` |

use std::collections::{BTreeMap, BTreeSet};

use cuescore_types::{LedgerSnapshot, PenaltyEvent, PenaltyRule, Player, PlayerId, Turn, TurnId};

use crate::closure::{self, ClosureResult};
use crate::turn::{self, TurnBuilder};
use crate::{LedgerError, NotFoundError, RuleTable, ValidationError};

/// Fewest players a match can seat.
pub const MIN_PLAYERS: usize = 3;
/// Most players a match can seat.
pub const MAX_PLAYERS: usize = 4;
/// Minimum length of a trimmed player name, in characters.
pub const MIN_NAME_CHARS: usize = 2;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The mutable record of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    players: Vec<Player>,
    active_turn_holder: Option<PlayerId>,
    round: u32,
    /// Newest first.
    history: Vec<Turn>,
    rules: RuleTable,
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreLedger {
    /// Create an idle ledger with the default rule table.
    pub fn new() -> Self {
        Self::with_rules(RuleTable::default())
    }

    /// Create an idle ledger with the given rule table.
    pub const fn with_rules(rules: RuleTable) -> Self {
        Self {
            players: Vec::new(),
            active_turn_holder: None,
            round: 1,
            history: Vec::new(),
            rules,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Seated players, in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Recorded turns, newest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// The current rule table.
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The player whose turn it is, if a match is in progress.
    pub fn active_turn_holder(&self) -> Option<&Player> {
        self.active_turn_holder
            .and_then(|id| self.players.iter().find(|p| p.id == id))
    }

    /// The current round number, starting at 1.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether a match is in progress.
    pub fn in_match(&self) -> bool {
        !self.players.is_empty()
    }

    /// Look up a seated player.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// 1-based chronological position of a turn (the oldest turn is 1).
    pub fn turn_number(&self, turn_id: TurnId) -> Option<usize> {
        let index = self.history.iter().position(|t| t.id == turn_id)?;
        self.history.len().checked_sub(index)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Replace the rule table. Recorded turns keep their frozen prices.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateTier`] or
    /// [`ValidationError::MissingTier`] unless every tier has exactly one
    /// rule.
    pub fn set_rules(&mut self, rules: &[PenaltyRule]) -> Result<(), LedgerError> {
        self.rules = RuleTable::from_rules(rules)?;
        tracing::debug!(rules = ?self.rules.to_rules(), "Rule table replaced");
        Ok(())
    }

    /// Seat a new match: ids `1..=N` in the given order, zero scores, the
    /// first player holds the turn, history cleared, round reset to 1.
    ///
    /// Starting while a match is in progress abandons that match.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PlayerCount`] unless 3 or 4 names are
    /// given, or [`ValidationError::NameTooShort`] if a trimmed name has
    /// fewer than [`MIN_NAME_CHARS`] characters.
    pub fn start_match<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), LedgerError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&names.len()) {
            return Err(ValidationError::PlayerCount { count: names.len() }.into());
        }

        let mut players = Vec::with_capacity(names.len());
        for (name, id) in names.iter().zip(1_u32..) {
            let raw = name.as_ref();
            let trimmed = raw.trim();
            if trimmed.chars().count() < MIN_NAME_CHARS {
                return Err(ValidationError::NameTooShort {
                    name: raw.to_owned(),
                }
                .into());
            }
            players.push(Player::new(PlayerId(id), trimmed.to_owned()));
        }

        self.active_turn_holder = players.first().map(|p| p.id);
        self.players = players;
        self.history.clear();
        self.round = 1;

        tracing::info!(
            players = self.players.len(),
            names = ?self.players.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "Match started"
        );
        Ok(())
    }

    /// Hand the turn to another seated player.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Player`] if no seated player has this id.
    pub fn select_turn_holder(&mut self, player_id: PlayerId) -> Result<(), LedgerError> {
        if self.player(player_id).is_none() {
            return Err(NotFoundError::Player(player_id).into());
        }
        self.active_turn_holder = Some(player_id);
        tracing::debug!(player = %player_id, "Turn holder selected");
        Ok(())
    }

    /// Record a scoring turn for the active turn holder.
    ///
    /// Each loser pays `points_per_loser`; the turn holder collects
    /// `points_per_loser x |losers|`. The new turn is prepended to the
    /// history and returned.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if no match is in progress, the
    /// loser or event list is empty or malformed, the turn holder is listed
    /// as a loser, or a loser is not seated.
    pub fn apply_penalty(
        &mut self,
        loser_ids: &[PlayerId],
        events: &[PenaltyEvent],
    ) -> Result<&Turn, LedgerError> {
        let winner = self
            .active_turn_holder
            .ok_or(ValidationError::NoActiveMatch)?;
        if let Some(unknown) = loser_ids.iter().find(|id| self.player(**id).is_none()) {
            return Err(ValidationError::UnknownPlayer(*unknown).into());
        }

        let created_at = self.next_timestamp();
        let turn = TurnBuilder::new(winner)
            .losers(loser_ids)
            .events(events)
            .created_at(created_at)
            .build(&self.rules)?;

        let deltas = closure::turn_deltas(&turn)?;
        let scores = self.staged_scores(&deltas)?;
        self.commit_scores(&scores);

        tracing::debug!(
            turn_id = %turn.id,
            winner = %turn.winner_id,
            losers = turn.loser_ids.len(),
            points_per_loser = turn.points_per_loser,
            "Penalty applied"
        );
        self.history.insert(0, turn);

        self.history
            .first()
            .ok_or_else(|| LedgerError::InconsistentSnapshot {
                reason: "failed to retrieve turn after insert".to_owned(),
            })
    }

    /// Remove the most recent turn and reverse exactly its score changes.
    ///
    /// Returns the removed turn, or `None` when the history is empty.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if reversal overflows,
    /// which cannot happen on a ledger that passed the closure audit.
    pub fn undo_last(&mut self) -> Result<Option<Turn>, LedgerError> {
        let Some(latest) = self.history.first() else {
            return Ok(None);
        };

        let inverse: Vec<(PlayerId, i64)> = closure::turn_deltas(latest)?
            .into_iter()
            .map(|(id, delta)| (id, delta.saturating_neg()))
            .collect();
        let scores = self.staged_scores(&inverse)?;
        self.commit_scores(&scores);

        let removed = self.history.remove(0);
        tracing::debug!(turn_id = %removed.id, "Latest turn undone");
        Ok(Some(removed))
    }

    /// Delete `turn_id` and every newer turn, then recompute every score
    /// from zero over the surviving history.
    ///
    /// Returns the number of turns removed; an unknown id removes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if recomputation
    /// overflows.
    pub fn rewind_to(&mut self, turn_id: TurnId) -> Result<usize, LedgerError> {
        let Some(index) = self.history.iter().position(|t| t.id == turn_id) else {
            tracing::debug!(turn_id = %turn_id, "Rewind target not in history");
            return Ok(0);
        };
        let removed = index.saturating_add(1);
        let survivors = self.history.get(removed..).unwrap_or_default();

        let scores = closure::recompute_scores(&self.players, survivors)?;
        self.commit_scores(&scores);
        self.history = self.history.split_off(removed);

        tracing::debug!(turn_id = %turn_id, removed, "History rewound");
        Ok(removed)
    }

    /// Zero every score and clear the history, keeping the seated players.
    /// The first player takes the turn; the round number is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoActiveMatch`] when idle.
    pub fn restart_round(&mut self) -> Result<(), LedgerError> {
        self.clear_scores()?;
        tracing::info!(round = self.round, "Round restarted");
        Ok(())
    }

    /// Finish the round: zero every score, clear the history, hand the turn
    /// to the first player, and advance the round counter.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoActiveMatch`] when idle, or
    /// [`LedgerError::ArithmeticOverflow`] if the round counter is exhausted.
    pub fn next_round(&mut self) -> Result<(), LedgerError> {
        let next = self
            .round
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow {
                context: "round number",
            })?;
        self.clear_scores()?;
        self.round = next;
        tracing::info!(round = self.round, "Next round");
        Ok(())
    }

    /// Return to the idle state with the default rule table.
    pub fn reset_all(&mut self) {
        *self = Self::new();
        tracing::info!("Ledger reset");
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the full ledger state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            players: self.players.clone(),
            active_turn_holder_id: self.active_turn_holder,
            round: self.round,
            history: self.history.clone(),
            rules: self.rules.to_rules(),
        }
    }

    /// Rebuild a ledger from a snapshot, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InconsistentSnapshot`] if the seating, the
    /// turn holder, any turn, the ordering of the history, the rule table,
    /// or the score closure is invalid.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let invalid = |reason: String| LedgerError::InconsistentSnapshot { reason };

        let count = snapshot.players.len();
        if count != 0 && !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(invalid(format!("{count} players seated")));
        }
        let mut seats = BTreeSet::new();
        for (player, seat) in snapshot.players.iter().zip(1_u32..) {
            if player.id != PlayerId(seat) {
                return Err(invalid(format!("player {} sits in seat {seat}", player.id)));
            }
            seats.insert(player.id);
            if player.name.trim() != player.name {
                return Err(invalid(format!("player {} has an untrimmed name", player.id)));
            }
            if player.name.chars().count() < MIN_NAME_CHARS {
                return Err(invalid(format!("player {} has a short name", player.id)));
            }
        }

        match snapshot.active_turn_holder_id {
            Some(id) if !seats.contains(&id) => {
                return Err(invalid(format!("turn holder {id} is not seated")));
            }
            None if count != 0 => {
                return Err(invalid("match in progress without a turn holder".to_owned()));
            }
            _ => {}
        }
        if snapshot.round == 0 {
            return Err(invalid("round number is zero".to_owned()));
        }

        let mut turn_ids = BTreeSet::new();
        let mut newer_at = i64::MAX;
        for turn in &snapshot.history {
            if !turn_ids.insert(turn.id) {
                return Err(invalid(format!("duplicate turn {}", turn.id)));
            }
            if turn.created_at > newer_at {
                return Err(invalid(format!("turn {} is out of order", turn.id)));
            }
            newer_at = turn.created_at;
            if let Some(id) = std::iter::once(&turn.winner_id)
                .chain(&turn.loser_ids)
                .find(|id| !seats.contains(*id))
            {
                return Err(invalid(format!("turn {} references unseated player {id}", turn.id)));
            }
            turn::check_shape(turn.winner_id, &turn.loser_ids, &turn.events)
                .map_err(|e| invalid(format!("turn {}: {e}", turn.id)))?;
        }

        let rules = RuleTable::from_rules(&snapshot.rules)
            .map_err(|e| invalid(format!("rule table: {e}")))?;

        if let ClosureResult::Drift(drift) =
            closure::verify_scores(&snapshot.players, &snapshot.history)
        {
            return Err(invalid(drift.message));
        }

        Ok(Self {
            players: snapshot.players,
            active_turn_holder: snapshot.active_turn_holder_id,
            round: snapshot.round,
            history: snapshot.history,
            rules,
        })
    }

    /// Audit the cached scores against the history.
    pub fn verify_closure(&self) -> ClosureResult {
        closure::verify_scores(&self.players, &self.history)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Current scores with `deltas` applied, without mutating the ledger.
    fn staged_scores(
        &self,
        deltas: &[(PlayerId, i64)],
    ) -> Result<BTreeMap<PlayerId, i64>, LedgerError> {
        let mut scores: BTreeMap<PlayerId, i64> =
            self.players.iter().map(|p| (p.id, p.score)).collect();
        closure::accumulate(&mut scores, deltas)?;
        Ok(scores)
    }

    fn commit_scores(&mut self, scores: &BTreeMap<PlayerId, i64>) {
        for player in &mut self.players {
            if let Some(score) = scores.get(&player.id) {
                player.score = *score;
            }
        }
    }

    fn clear_scores(&mut self) -> Result<(), LedgerError> {
        let first = self
            .players
            .first()
            .map(|p| p.id)
            .ok_or(ValidationError::NoActiveMatch)?;
        for player in &mut self.players {
            player.score = 0;
        }
        self.history.clear();
        self.active_turn_holder = Some(first);
        Ok(())
    }

    /// Wall-clock milliseconds, clamped so the history never goes backwards.
    fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.history
            .first()
            .map_or(now, |newest| now.max(newest.created_at))
    }
}
