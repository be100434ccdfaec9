use thiserror::Error;

use crate::matches::StoreError;

#[derive(Debug, Error)]
pub enum BracketError {
    #[error("A bracket needs between 1 and {max} rounds, got {rounds}")]
    InvalidRounds { rounds: u32, max: u32 },

    #[error("No slot at round {round}, position {position}")]
    SlotNotFound { round: u32, position: u32 },

    #[error("Slot at round {round}, position {position} already has a match or a result")]
    SlotLocked { round: u32, position: u32 },

    #[error("Only opening round slots are filled by hand, round {0} fills by advancement")]
    NotOpeningRound(u32),

    #[error("Competitor {0} is already on the other side of this slot")]
    SameCompetitorBothSides(String),

    #[error("Slot at round {round}, position {position} needs two competitors")]
    MissingCompetitor { round: u32, position: u32 },

    #[error("Competitor {0} appears more than once in the draw")]
    DuplicateAthlete(String),

    #[error("Draw of {athletes} athletes exceeds the {capacity} opening places")]
    DrawOverCapacity { athletes: usize, capacity: usize },

    #[error("Reset confirmation does not match the competition id")]
    ConfirmationMismatch,

    #[error("Bracket not found: {0}")]
    NotFound(String),

    #[error("Match store error: {0}")]
    Store(#[from] StoreError),
}
