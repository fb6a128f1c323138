//! Turn construction and validation.
//!
//! Provides a [`TurnBuilder`] that enforces the shape of a scoring turn:
//! a non-empty set of distinct losers that excludes the turn holder, and a
//! non-empty list of potted-ball events with at most one entry per tier.
//! The builder prices the turn against a [`RuleTable`] and freezes the
//! result into the [`Turn`].

use std::collections::BTreeSet;

use chrono::Utc;

use cuescore_types::{PenaltyEvent, PlayerId, Turn, TurnId};

use crate::{LedgerError, RuleTable, ValidationError};

// ---------------------------------------------------------------------------
// Turn builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`Turn`] values.
///
/// # Examples
///
/// ```
/// use cuescore_ledger::{RuleTable, TurnBuilder};
/// use cuescore_types::{PenaltyEvent, PlayerId, Tier};
///
/// let turn = TurnBuilder::new(PlayerId(1))
///     .losers(&[PlayerId(2), PlayerId(3)])
///     .events(&[PenaltyEvent::new(Tier::Six, 1), PenaltyEvent::new(Tier::Nine, 1)])
///     .build(&RuleTable::default());
///
/// assert_eq!(turn.ok().map(|t| t.points_per_loser), Some(5));
/// ```
#[derive(Debug)]
pub struct TurnBuilder {
    winner: PlayerId,
    losers: Vec<PlayerId>,
    events: Vec<PenaltyEvent>,
    created_at: Option<i64>,
}

impl TurnBuilder {
    /// Start building a turn held by `winner`.
    pub const fn new(winner: PlayerId) -> Self {
        Self {
            winner,
            losers: Vec::new(),
            events: Vec::new(),
            created_at: None,
        }
    }

    /// Set the penalized players, in selection order.
    #[must_use]
    pub fn losers(mut self, losers: &[PlayerId]) -> Self {
        self.losers = losers.to_vec();
        self
    }

    /// Set the potted-ball events.
    #[must_use]
    pub fn events(mut self, events: &[PenaltyEvent]) -> Self {
        self.events = events.to_vec();
        self
    }

    /// Pin the creation timestamp (milliseconds since the Unix epoch).
    ///
    /// Defaults to the current wall-clock time.
    #[must_use]
    pub const fn created_at(mut self, millis: i64) -> Self {
        self.created_at = Some(millis);
        self
    }

    /// Validate inputs, price the turn, and produce a [`Turn`] with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the turn shape is invalid, or
    /// [`LedgerError::ArithmeticOverflow`] if pricing overflows.
    pub fn build(self, rules: &RuleTable) -> Result<Turn, LedgerError> {
        check_shape(self.winner, &self.losers, &self.events)?;
        let points_per_loser = rules.points_for(&self.events)?;

        Ok(Turn {
            id: TurnId::new(),
            winner_id: self.winner,
            loser_ids: self.losers,
            events: self.events,
            points_per_loser,
            created_at: self
                .created_at
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        })
    }
}

/// Validate the participant and event shape of a turn.
///
/// Used both when building new turns and when restoring stored ones.
pub(crate) fn check_shape(
    winner: PlayerId,
    losers: &[PlayerId],
    events: &[PenaltyEvent],
) -> Result<(), ValidationError> {
    if losers.is_empty() {
        return Err(ValidationError::EmptyLosers);
    }
    if events.is_empty() {
        return Err(ValidationError::EmptyEvents);
    }

    let mut seen = BTreeSet::new();
    for loser in losers {
        if *loser == winner {
            return Err(ValidationError::TurnHolderAsLoser(winner));
        }
        if !seen.insert(*loser) {
            return Err(ValidationError::DuplicateLoser(*loser));
        }
    }

    let mut tiers = BTreeSet::new();
    for event in events {
        if !tiers.insert(event.tier) {
            return Err(ValidationError::DuplicateTier(event.tier));
        }
        if event.count == 0 {
            return Err(ValidationError::ZeroCount(event.tier));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use cuescore_types::Tier;

    use super::*;

    fn nine() -> PenaltyEvent {
        PenaltyEvent::new(Tier::Nine, 1)
    }

    #[test]
    fn builder_prices_and_freezes_points() {
        let result = TurnBuilder::new(PlayerId(1))
            .losers(&[PlayerId(2), PlayerId(3)])
            .events(&[nine()])
            .created_at(42)
            .build(&RuleTable::default());

        assert!(result.is_ok());
        if let Ok(turn) = result {
            assert_eq!(turn.winner_id, PlayerId(1));
            assert_eq!(turn.loser_ids, vec![PlayerId(2), PlayerId(3)]);
            assert_eq!(turn.points_per_loser, 3);
            assert_eq!(turn.created_at, 42);
        }
    }

    #[test]
    fn empty_losers_rejected() {
        let result = TurnBuilder::new(PlayerId(1))
            .events(&[nine()])
            .build(&RuleTable::default());
        assert_eq!(result.err(), Some(ValidationError::EmptyLosers.into()));
    }

    #[test]
    fn empty_events_rejected() {
        let result = TurnBuilder::new(PlayerId(1))
            .losers(&[PlayerId(2)])
            .build(&RuleTable::default());
        assert_eq!(result.err(), Some(ValidationError::EmptyEvents.into()));
    }

    #[test]
    fn turn_holder_cannot_lose() {
        let result = TurnBuilder::new(PlayerId(1))
            .losers(&[PlayerId(2), PlayerId(1)])
            .events(&[nine()])
            .build(&RuleTable::default());
        assert_eq!(
            result.err(),
            Some(ValidationError::TurnHolderAsLoser(PlayerId(1)).into())
        );
    }

    #[test]
    fn duplicate_loser_rejected() {
        let result = TurnBuilder::new(PlayerId(1))
            .losers(&[PlayerId(2), PlayerId(2)])
            .events(&[nine()])
            .build(&RuleTable::default());
        assert_eq!(
            result.err(),
            Some(ValidationError::DuplicateLoser(PlayerId(2)).into())
        );
    }

    #[test]
    fn repeated_tier_rejected() {
        let result = TurnBuilder::new(PlayerId(1))
            .losers(&[PlayerId(2)])
            .events(&[nine(), PenaltyEvent::new(Tier::Nine, 2)])
            .build(&RuleTable::default());
        assert_eq!(
            result.err(),
            Some(ValidationError::DuplicateTier(Tier::Nine).into())
        );
    }

    #[test]
    fn zero_count_rejected() {
        let result = TurnBuilder::new(PlayerId(1))
            .losers(&[PlayerId(2)])
            .events(&[PenaltyEvent::new(Tier::Three, 0)])
            .build(&RuleTable::default());
        assert_eq!(
            result.err(),
            Some(ValidationError::ZeroCount(Tier::Three).into())
        );
    }

    #[test]
    fn each_build_gets_a_fresh_id() {
        let build = || {
            TurnBuilder::new(PlayerId(1))
                .losers(&[PlayerId(2)])
                .events(&[nine()])
                .build(&RuleTable::default())
                .ok()
                .map(|t| t.id)
        };
        assert_ne!(build(), build());
    }
}
