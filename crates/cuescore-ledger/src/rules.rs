//! The penalty rule table: what each potted tier costs a loser.
//!
//! The table is a pure lookup. It is configured before a match (and may be
//! edited during one), but pricing happens once, when a turn is recorded;
//! the resulting `points_per_loser` is frozen into the turn.

use std::collections::BTreeMap;

use cuescore_types::{PenaltyEvent, PenaltyRule, Tier};

use crate::{LedgerError, ValidationError};

/// Default point value of the 3-ball.
pub const DEFAULT_THREE: u32 = 1;
/// Default point value of the 6-ball.
pub const DEFAULT_SIX: u32 = 2;
/// Default point value of the 9-ball.
pub const DEFAULT_NINE: u32 = 3;

/// Mapping from [`Tier`] to point value, at most one entry per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    values: BTreeMap<Tier, u32>,
}

impl Default for RuleTable {
    /// The house defaults: 3-ball 1 point, 6-ball 2, 9-ball 3.
    fn default() -> Self {
        Self::from_values(DEFAULT_THREE, DEFAULT_SIX, DEFAULT_NINE)
    }
}

impl RuleTable {
    /// Build a table with a value for every tier.
    pub fn from_values(three: u32, six: u32, nine: u32) -> Self {
        let values = BTreeMap::from([(Tier::Three, three), (Tier::Six, six), (Tier::Nine, nine)]);
        Self { values }
    }

    /// Build a table from a rule list holding exactly one rule per tier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateTier`] if a tier appears twice,
    /// or [`ValidationError::MissingTier`] if a tier has no rule.
    pub fn from_rules(rules: &[PenaltyRule]) -> Result<Self, LedgerError> {
        let mut values = BTreeMap::new();
        for rule in rules {
            if values.insert(rule.tier, rule.point_value).is_some() {
                return Err(ValidationError::DuplicateTier(rule.tier).into());
            }
        }
        if let Some(missing) = Tier::ALL.into_iter().find(|t| !values.contains_key(t)) {
            return Err(ValidationError::MissingTier(missing).into());
        }
        Ok(Self { values })
    }

    /// Point value of `tier`.
    pub fn value_for(&self, tier: Tier) -> u32 {
        self.values.get(&tier).copied().unwrap_or(0)
    }

    /// The table as a rule list in ascending tier order.
    pub fn to_rules(&self) -> Vec<PenaltyRule> {
        self.values
            .iter()
            .map(|(tier, value)| PenaltyRule::new(*tier, *value))
            .collect()
    }

    /// Price a turn: the sum of `count x value` over its events.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ArithmeticOverflow`] if the total does not fit.
    pub fn points_for(&self, events: &[PenaltyEvent]) -> Result<u32, LedgerError> {
        let overflow = LedgerError::ArithmeticOverflow {
            context: "points per loser",
        };
        let mut total: u32 = 0;
        for event in events {
            let priced = event
                .count
                .checked_mul(self.value_for(event.tier))
                .ok_or_else(|| overflow.clone())?;
            total = total.checked_add(priced).ok_or_else(|| overflow.clone())?;
        }
        Ok(total)
    }
}
