//! Score ledger engine for the Cuescore penalty-ball game.
//!
//! Players take turns; when the turn holder pots a designated object ball
//! (3, 6 or 9) the penalized players each pay the configured point value,
//! and the turn holder collects what they pay. Every scoring turn is kept in
//! an append-ordered history so that any turn, or any run of recent turns,
//! can be taken back.
//!
//! # Architecture
//!
//! - [`rules`] -- The [`RuleTable`]: tier to point-value lookup.
//! - [`turn`] -- The [`TurnBuilder`] for validated, priced turn construction.
//! - [`ledger`] -- The [`ScoreLedger`]: players, turn holder, history, and
//!   every mutation (start, apply, undo, rewind, reset).
//! - [`closure`] -- Recomputes scores from history and audits the cached
//!   scores against it.
//! - [`achievements`] -- Pure statistics over the history.
//! - [`summary`] -- End-of-match standings and the history label formatter.
//!
//! # Score Closure
//!
//! For every player P:
//!
//! ```text
//! P.score == sum(points_per_loser * |losers| for turns won by P)
//!          - sum(points_per_loser for turns where P is a loser)
//! ```
//!
//! Each turn is zero-sum, so the table total is always zero. A violation is
//! reported as a [`ScoreDrift`] by [`closure::verify_scores`].
//!
//! # Usage
//!
//! ```
//! use cuescore_ledger::ScoreLedger;
//! use cuescore_types::{PenaltyEvent, PlayerId, Tier};
//!
//! let mut ledger = ScoreLedger::new();
//! ledger.start_match(&["Alice", "Bob", "Carol"]).ok();
//!
//! // Alice pots the 9-ball against Bob and Carol.
//! ledger
//!     .apply_penalty(&[PlayerId(2), PlayerId(3)], &[PenaltyEvent::new(Tier::Nine, 1)])
//!     .ok();
//!
//! let scores: Vec<i64> = ledger.players().iter().map(|p| p.score).collect();
//! assert_eq!(scores, vec![6, -3, -3]);
//!
//! ledger.undo_last().ok();
//! assert!(ledger.players().iter().all(|p| p.score == 0));
//! ```

pub mod achievements;
pub mod closure;
pub mod ledger;
pub mod rules;
pub mod summary;
pub mod turn;

// Re-export primary types at crate root.
pub use achievements::derive_achievements;
pub use closure::{ClosureResult, ScoreDrift};
pub use ledger::{MAX_PLAYERS, MIN_NAME_CHARS, MIN_PLAYERS, ScoreLedger};
pub use rules::RuleTable;
pub use summary::{render_events, summarize};
pub use turn::TurnBuilder;

use cuescore_types::{PlayerId, Tier};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by ledger commands.
///
/// A command that fails never mutates the ledger.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The command arguments were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The command referenced an entity that does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Score arithmetic overflowed.
    #[error("arithmetic overflow while computing {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },

    /// A restored snapshot violates a ledger invariant.
    #[error("inconsistent ledger snapshot: {reason}")]
    InconsistentSnapshot {
        /// Which invariant failed.
        reason: String,
    },
}

/// Rejected command arguments.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A match needs between [`MIN_PLAYERS`] and [`MAX_PLAYERS`] players.
    #[error("a match needs 3 or 4 players, got {count}")]
    PlayerCount {
        /// The number of names supplied.
        count: usize,
    },

    /// A player name is shorter than [`MIN_NAME_CHARS`] after trimming.
    #[error("player name {name:?} must have at least 2 characters")]
    NameTooShort {
        /// The offending name, as supplied.
        name: String,
    },

    /// No loser was selected.
    #[error("at least one penalized player is required")]
    EmptyLosers,

    /// No potted ball was selected.
    #[error("at least one penalty ball is required")]
    EmptyEvents,

    /// The turn holder cannot penalize themselves.
    #[error("turn holder {0} cannot be a loser of their own turn")]
    TurnHolderAsLoser(PlayerId),

    /// The same player was listed twice as a loser.
    #[error("player {0} listed more than once as a loser")]
    DuplicateLoser(PlayerId),

    /// The same tier appeared twice in one rule table or event list.
    #[error("{0} listed more than once")]
    DuplicateTier(Tier),

    /// A rule table without a rule for this tier.
    #[error("no rule for the {0}")]
    MissingTier(Tier),

    /// A penalty event with a zero ball count.
    #[error("{0} count must be positive")]
    ZeroCount(Tier),

    /// A loser id does not belong to any seated player.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The command needs a match in progress.
    #[error("no match in progress")]
    NoActiveMatch,
}

/// A referenced entity does not exist.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NotFoundError {
    /// No seated player has this id.
    #[error("player not found: {0}")]
    Player(PlayerId),
}
