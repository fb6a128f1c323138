//! A persisted match session.
//!
//! [`MatchSession`] owns the in-memory [`ScoreLedger`] and a
//! [`PersistenceCodec`]. Every command runs against the ledger first; when
//! it succeeds the full state is written back. A failed write is logged and
//! swallowed: the in-memory ledger stays authoritative and at most the
//! latest change is lost if the process dies before the next write.

use cuescore_ledger::{RuleTable, ScoreLedger, derive_achievements, summarize};
use cuescore_store::{FileStorage, LoadOutcome, PersistenceCodec, StorageMedium};
use cuescore_types::{Achievements, MatchSummary, PenaltyEvent, PenaltyRule, PlayerId, Turn, TurnId};

use crate::config::SessionConfig;
use crate::error::SessionError;

/// A ledger bound to the storage it is persisted in.
#[derive(Debug)]
pub struct MatchSession<M: StorageMedium> {
    ledger: ScoreLedger,
    codec: PersistenceCodec<M>,
    preset: RuleTable,
}

impl MatchSession<FileStorage> {
    /// Open the session stored under `config.storage.dir`.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::open(
            FileStorage::new(config.storage.dir.clone()),
            config.rules.table(),
        )
    }
}

impl<M: StorageMedium> MatchSession<M> {
    /// Open a session on `medium`.
    ///
    /// The stored rule preset, if any, replaces `default_rules`. A stored
    /// match is resumed; otherwise the session starts idle with the preset.
    pub fn open(medium: M, default_rules: RuleTable) -> Self {
        let mut codec = PersistenceCodec::new(medium);
        let preset = codec.load_rule_preset().unwrap_or(default_rules);
        let (stored, outcome) = codec.load_with_outcome();

        let ledger = if matches!(outcome, LoadOutcome::Restored) {
            stored
        } else {
            ScoreLedger::with_rules(preset.clone())
        };
        tracing::info!(
            outcome = ?outcome,
            players = ledger.players().len(),
            turns = ledger.history().len(),
            round = ledger.round(),
            "Session opened"
        );

        Self {
            ledger,
            codec,
            preset,
        }
    }

    /// The live ledger.
    pub const fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// The rule preset new matches start with.
    pub const fn rule_preset(&self) -> &RuleTable {
        &self.preset
    }

    /// The storage codec.
    pub const fn codec(&self) -> &PersistenceCodec<M> {
        &self.codec
    }

    /// Seat a new match using the current rule preset.
    pub fn start_match<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), SessionError> {
        self.ledger.start_match(names)?;
        self.ledger.set_rules(&self.preset.to_rules())?;
        self.persist();
        Ok(())
    }

    /// Seat a new match with `rules`, which also become the stored preset.
    pub fn start_match_with_rules<S: AsRef<str>>(
        &mut self,
        names: &[S],
        rules: &[PenaltyRule],
    ) -> Result<(), SessionError> {
        let table = RuleTable::from_rules(rules)?;
        self.ledger.start_match(names)?;
        self.ledger.set_rules(rules)?;
        self.preset = table;
        if let Err(e) = self.codec.save_rule_preset(&self.preset) {
            tracing::warn!(error = %e, "Failed to persist rule preset");
        }
        self.persist();
        Ok(())
    }

    /// Replace the live rule table. The preset is unchanged.
    pub fn set_rules(&mut self, rules: &[PenaltyRule]) -> Result<(), SessionError> {
        self.ledger.set_rules(rules)?;
        self.persist();
        Ok(())
    }

    /// Hand the turn to another seated player.
    pub fn select_turn_holder(&mut self, player_id: PlayerId) -> Result<(), SessionError> {
        self.ledger.select_turn_holder(player_id)?;
        self.persist();
        Ok(())
    }

    /// Record a scoring turn for the active turn holder.
    pub fn apply_penalty(
        &mut self,
        loser_ids: &[PlayerId],
        events: &[PenaltyEvent],
    ) -> Result<Turn, SessionError> {
        let turn = self.ledger.apply_penalty(loser_ids, events)?.clone();
        self.persist();
        Ok(turn)
    }

    /// Remove the most recent turn.
    pub fn undo_last(&mut self) -> Result<Option<Turn>, SessionError> {
        let removed = self.ledger.undo_last()?;
        if removed.is_some() {
            self.persist();
        }
        Ok(removed)
    }

    /// Delete `turn_id` and every newer turn.
    pub fn rewind_to(&mut self, turn_id: TurnId) -> Result<usize, SessionError> {
        let removed = self.ledger.rewind_to(turn_id)?;
        if removed > 0 {
            self.persist();
        }
        Ok(removed)
    }

    /// Replay the current round from zero.
    pub fn restart_round(&mut self) -> Result<(), SessionError> {
        self.ledger.restart_round()?;
        self.persist();
        Ok(())
    }

    /// Close the current round and start the next one.
    pub fn next_round(&mut self) -> Result<(), SessionError> {
        self.ledger.next_round()?;
        self.persist();
        Ok(())
    }

    /// Discard the match and its stored copy. The rule preset survives.
    pub fn reset_all(&mut self) {
        self.ledger = ScoreLedger::with_rules(self.preset.clone());
        tracing::info!("Session reset");
        if let Err(e) = self.codec.clear() {
            tracing::warn!(error = %e, "Failed to delete stored ledger");
        }
    }

    /// Achievements of the current history.
    pub fn achievements(&self) -> Achievements {
        derive_achievements(self.ledger.history())
    }

    /// Standings and champion of the current round.
    pub fn summary(&self) -> MatchSummary {
        summarize(self.ledger.players(), self.ledger.history())
    }

    fn persist(&mut self) {
        if let Err(e) = self.codec.save(&self.ledger) {
            tracing::warn!(error = %e, "Failed to persist ledger");
        }
    }
}
