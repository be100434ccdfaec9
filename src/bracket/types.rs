use serde::{Deserialize, Serialize};

use super::engine::{BracketSnapshot, ReconcileReport};
use crate::scoring::{BoutCategory, Side};

/// Request payload for opening (or reloading) a competition's bracket
#[derive(Debug, Deserialize)]
pub struct OpenBracketRequest {
    pub rounds: u32,
    pub category: Option<BoutCategory>,
    #[serde(default)]
    pub legacy_pair_fallback: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignCompetitorRequest {
    pub round: u32,
    pub position: u32,
    pub side: Side,
    pub competitor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignJudgeRequest {
    pub round: u32,
    pub position: u32,
    pub judge_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    pub athletes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub round: u32,
    pub position: u32,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    /// Must repeat the competition id
    pub confirmation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub report: ReconcileReport,
    pub bracket: BracketSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub deleted_matches: u64,
}
