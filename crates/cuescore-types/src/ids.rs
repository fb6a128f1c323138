//! Type-safe identifier wrappers.
//!
//! Players are seated with small sequential integers (1..=N) at match
//! start, so [`PlayerId`] wraps a `u32`. Turns need only be unique within
//! one ledger's lifetime; [`TurnId`] wraps a UUID v7 so identifiers are
//! also time-ordered when inspected in a stored document.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Seat identifier of a player, assigned sequentially from 1 at match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Return the raw seat number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PlayerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for a recorded turn in the score history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct TurnId(pub Uuid);

impl TurnId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TurnId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TurnId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_ids_are_unique() {
        let a = TurnId::new();
        let b = TurnId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn player_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&PlayerId(3)).ok();
        assert_eq!(json.as_deref(), Some("3"));
    }

    #[test]
    fn turn_id_serializes_as_string() {
        let id = TurnId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{id}\"")));
    }
}
