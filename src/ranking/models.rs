use serde::{Deserialize, Serialize};

/// One line of the public standings table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub competitor_id: String,
    pub bouts: u32,
    pub wins: u32,
    pub losses: u32,
    pub current_win_streak: u32,
    pub best_win_streak: u32,
    /// 1-based; 0 until positions are recalculated
    pub position: u32,
}

impl RankingEntry {
    pub fn new(competitor_id: &str) -> Self {
        Self {
            competitor_id: competitor_id.to_string(),
            ..Self::default()
        }
    }
}
