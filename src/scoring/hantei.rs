use serde::{Deserialize, Serialize};

use super::{ResultReason, ScoringError, Side};

/// Panel size used when nothing else is configured
pub const DEFAULT_HANTEI_JUDGES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ballot {
    #[default]
    Unset,
    Competitor1,
    Competitor2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HanteiOutcome {
    Decided { winner: Side, reason: ResultReason },
    /// Equal ballots and no override; the panel has to vote again
    UnresolvedTie { votes1: u32, votes2: u32 },
}

/// Judge decision taken when the point totals are tied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HanteiVote {
    ballots: Vec<Ballot>,
    competitor1_win: bool,
    competitor2_win: bool,
}

impl HanteiVote {
    pub fn new(judges: usize) -> Result<Self, ScoringError> {
        if judges == 0 {
            return Err(ScoringError::EmptyPanel);
        }

        Ok(Self {
            ballots: vec![Ballot::Unset; judges],
            competitor1_win: false,
            competitor2_win: false,
        })
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn cast(&mut self, judge_index: usize, ballot: Ballot) -> Result<(), ScoringError> {
        let judges = self.ballots.len();
        let slot = self
            .ballots
            .get_mut(judge_index)
            .ok_or(ScoringError::InvalidBallot {
                index: judge_index,
                judges,
            })?;
        *slot = ballot;
        Ok(())
    }

    /// Set a direct-win override. The two overrides are mutually exclusive,
    /// so setting one clears the other.
    pub fn set_override(&mut self, side: Side, value: bool) {
        match side {
            Side::Competitor1 => {
                self.competitor1_win = value;
                if value {
                    self.competitor2_win = false;
                }
            }
            Side::Competitor2 => {
                self.competitor2_win = value;
                if value {
                    self.competitor1_win = false;
                }
            }
        }
    }

    pub fn override_for(&self, side: Side) -> bool {
        match side {
            Side::Competitor1 => self.competitor1_win,
            Side::Competitor2 => self.competitor2_win,
        }
    }

    /// Ballot counts as (competitor1, competitor2); unset ballots are ignored
    pub fn counts(&self) -> (u32, u32) {
        self.ballots
            .iter()
            .fold((0, 0), |(one, two), ballot| match ballot {
                Ballot::Competitor1 => (one + 1, two),
                Ballot::Competitor2 => (one, two + 1),
                Ballot::Unset => (one, two),
            })
    }

    /// Clear ballots and overrides for a fresh round of voting
    pub fn clear(&mut self) {
        self.ballots.iter_mut().for_each(|b| *b = Ballot::Unset);
        self.competitor1_win = false;
        self.competitor2_win = false;
    }

    pub fn confirm(&self) -> HanteiOutcome {
        if self.competitor1_win {
            return HanteiOutcome::Decided {
                winner: Side::Competitor1,
                reason: ResultReason::ByDirectDecision,
            };
        }
        if self.competitor2_win {
            return HanteiOutcome::Decided {
                winner: Side::Competitor2,
                reason: ResultReason::ByDirectDecision,
            };
        }

        let (votes1, votes2) = self.counts();
        if votes1 > votes2 {
            HanteiOutcome::Decided {
                winner: Side::Competitor1,
                reason: ResultReason::ByHanteiDecision,
            }
        } else if votes2 > votes1 {
            HanteiOutcome::Decided {
                winner: Side::Competitor2,
                reason: ResultReason::ByHanteiDecision,
            }
        } else {
            HanteiOutcome::UnresolvedTie { votes1, votes2 }
        }
    }
}
