use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::{BoutScore, HanteiVote, ScoringError, Side, DEFAULT_HANTEI_JUDGES};

/// Why a bout ended the way it did
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultReason {
    ByPoints,
    ByHanteiDecision,
    ByDirectDecision,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub winner: Side,
    pub reason: ResultReason,
}

/// Outcome of looking at the point totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Decided(Decision),
    /// Totals are level; a fresh vote for the judge panel
    Hantei(HanteiVote),
}

/// Final outcome of a bout. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutResult {
    winner_id: Option<String>,
    reason: ResultReason,
    final_score: (u32, u32),
}

impl BoutResult {
    pub fn decided(winner_id: String, reason: ResultReason, final_score: (u32, u32)) -> Self {
        Self {
            winner_id: Some(winner_id),
            reason,
            final_score,
        }
    }

    /// Unresolved tie. Display only; never written as a final result.
    pub fn unresolved(final_score: (u32, u32)) -> Self {
        Self {
            winner_id: None,
            reason: ResultReason::Tie,
            final_score,
        }
    }

    pub fn winner_id(&self) -> Option<&str> {
        self.winner_id.as_deref()
    }

    pub fn reason(&self) -> ResultReason {
        self.reason
    }

    pub fn final_score(&self) -> (u32, u32) {
        self.final_score
    }

    pub fn is_final(&self) -> bool {
        self.winner_id.is_some() && self.reason != ResultReason::Tie
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinnerResolver {
    hantei_judges: usize,
}

impl Default for WinnerResolver {
    fn default() -> Self {
        Self {
            hantei_judges: DEFAULT_HANTEI_JUDGES,
        }
    }
}

impl WinnerResolver {
    pub fn new(hantei_judges: usize) -> Result<Self, ScoringError> {
        if hantei_judges == 0 {
            return Err(ScoringError::EmptyPanel);
        }
        Ok(Self { hantei_judges })
    }

    pub fn hantei_judges(&self) -> usize {
        self.hantei_judges
    }

    pub fn resolve(&self, score: &BoutScore) -> Result<Resolution, ScoringError> {
        let (total1, total2) = score.totals();

        if total1 > total2 {
            Ok(Resolution::Decided(Decision {
                winner: Side::Competitor1,
                reason: ResultReason::ByPoints,
            }))
        } else if total2 > total1 {
            Ok(Resolution::Decided(Decision {
                winner: Side::Competitor2,
                reason: ResultReason::ByPoints,
            }))
        } else {
            Ok(Resolution::Hantei(HanteiVote::new(self.hantei_judges)?))
        }
    }
}
