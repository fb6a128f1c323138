//! Enumeration types for the penalty-ball rule set.

use serde::{Deserialize, Serialize};

/// One of the three designated object balls that trigger a penalty.
///
/// Serialized as the bare ball number (`3`, `6`, or `9`) so stored
/// documents stay readable and match the rule-table keys shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    /// The 3-ball.
    Three,
    /// The 6-ball.
    Six,
    /// The 9-ball.
    Nine,
}

impl Tier {
    /// Every tier, in ascending ball order.
    pub const ALL: [Self; 3] = [Self::Three, Self::Six, Self::Nine];

    /// Return the ball number of this tier.
    pub const fn ball(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Six => 6,
            Self::Nine => 9,
        }
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-ball", self.ball())
    }
}

/// A ball number that is not one of the penalty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ball {0} is not a penalty tier (expected 3, 6 or 9)")]
pub struct InvalidTier(pub u8);

impl TryFrom<u8> for Tier {
    type Error = InvalidTier;

    fn try_from(ball: u8) -> Result<Self, Self::Error> {
        match ball {
            3 => Ok(Self::Three),
            6 => Ok(Self::Six),
            9 => Ok(Self::Nine),
            other => Err(InvalidTier(other)),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.ball()
    }
}
