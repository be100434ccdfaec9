// Bout scoring rules
//
// Pure, synchronous state machines for a single kumite bout. Nothing in here
// touches storage or the runtime; the bout controller drives these types.

pub use clock::{BoutCategory, ClockState, MatchClock};
pub use hantei::{Ballot, HanteiOutcome, HanteiVote, DEFAULT_HANTEI_JUDGES};
pub use penalties::{PenaltyCategory, PenaltyFlag, PenaltyFlags, PenaltyTracker};
pub use resolver::{BoutResult, Decision, Resolution, ResultReason, WinnerResolver};
pub use tally::{BoutScore, ScoreTally, Technique};

mod clock;
mod hantei;
mod penalties;
mod resolver;
mod tally;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two competitors in a bout, or one side of a bracket slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Competitor1,
    Competitor2,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Competitor1 => Side::Competitor2,
            Side::Competitor2 => Side::Competitor1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Clock duration must be greater than zero")]
    InvalidDuration,

    #[error("Cannot change the category while the clock is running")]
    ClockRunning,

    #[error("Ballot index {index} is out of range for a panel of {judges}")]
    InvalidBallot { index: usize, judges: usize },

    #[error("Hantei panel needs at least one judge")]
    EmptyPanel,

    #[error("No Hantei vote is pending")]
    NoPendingHantei,

    #[error("Totals are not tied, the bout is decided by points")]
    NotTied,

    #[error("Score is frozen while a result awaits confirmation")]
    ScoreFrozen,

    #[error("Bout is already finalized")]
    BoutFinalized,

    #[error("No result is awaiting confirmation")]
    NoPendingResult,

    #[error("A declared winner needs a deciding reason, not a tie")]
    TieIsNotADecision,
}
