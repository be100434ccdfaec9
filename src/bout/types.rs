use serde::{Deserialize, Serialize};

use super::session::{BoutPhase, BoutSessionState, ResolveOutcome};
use crate::scoring::{
    Ballot, BoutCategory, BoutResult, ClockState, HanteiVote, PenaltyCategory, PenaltyFlag,
    PenaltyTracker, ResultReason, ScoreTally, Side, Technique,
};

/// Request payload for opening a bout outside any bracket
#[derive(Debug, Deserialize)]
pub struct OpenBoutRequest {
    pub competition_id: Option<String>,
    pub competitor1_id: String,
    pub competitor2_id: String,
    pub judge_id: Option<String>,
    pub category: Option<BoutCategory>,
}

#[derive(Debug, Deserialize)]
pub struct PointRequest {
    pub side: Side,
    pub technique: Technique,
}

#[derive(Debug, Deserialize)]
pub struct UndoPointRequest {
    pub side: Side,
}

#[derive(Debug, Deserialize)]
pub struct PenaltyRequest {
    pub side: Side,
    pub category: PenaltyCategory,
    pub flag: PenaltyFlag,
    pub value: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClockResetRequest {
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: BoutCategory,
}

#[derive(Debug, Deserialize)]
pub struct BallotRequest {
    pub judge_index: usize,
    pub ballot: Ballot,
}

#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub side: Side,
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeclareWinnerRequest {
    pub side: Side,
    pub reason: Option<ResultReason>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClockView {
    pub state: ClockState,
    pub remaining_seconds: u32,
    pub duration_seconds: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CornerView {
    pub competitor_id: String,
    pub score: ScoreTally,
    pub total: u32,
    pub penalties: PenaltyTracker,
}

/// What the judge console renders for one bout
#[derive(Debug, Serialize, Deserialize)]
pub struct BoutResponse {
    pub id: String,
    pub competition_id: Option<String>,
    pub category: String,
    pub phase: BoutPhase,
    pub competitor1: CornerView,
    pub competitor2: CornerView,
    pub clock: ClockView,
    pub hantei: Option<HanteiVote>,
    pub pending_result: Option<BoutResult>,
    pub result: Option<BoutResult>,
    pub last_error: Option<String>,
}

impl From<&BoutSessionState> for BoutResponse {
    fn from(session: &BoutSessionState) -> Self {
        let corner = |side: Side| CornerView {
            competitor_id: session.competitor_id(side).to_string(),
            score: *session.score().tally(side),
            total: session.score().total(side),
            penalties: *session.penalties(side),
        };

        Self {
            id: session.bout_id().to_string(),
            competition_id: session.participants().competition_id.clone(),
            category: session.category().to_string(),
            phase: session.phase(),
            competitor1: corner(Side::Competitor1),
            competitor2: corner(Side::Competitor2),
            clock: ClockView {
                state: session.clock().state(),
                remaining_seconds: session.clock().remaining_seconds(),
                duration_seconds: session.clock().duration_seconds(),
            },
            hantei: session.hantei().cloned(),
            pending_result: session.pending_result().cloned(),
            result: session.result().cloned(),
            last_error: session.last_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub outcome: ResolveOutcome,
    pub bout: BoutResponse,
}
