use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::scoring::ResultReason;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchState {
    Scheduled,
    InProgress,
    Finalized,
    Cancelled,
}

/// Bracket coordinates stored on a match record so the bracket can join on
/// them instead of guessing from the competitor pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub round: u32,
    pub position: u32,
}

impl SlotKey {
    pub fn new(round: u32, position: u32) -> Self {
        Self { round, position }
    }
}

/// Row in the matches table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub competition_id: Option<String>,
    pub slot: Option<SlotKey>,
    pub competitor1_id: String,
    pub competitor2_id: String,
    pub judge_id: Option<String>,
    pub category: String,
    pub duration_seconds: u32,
    pub state: MatchState,
    pub winner_id: Option<String>,
    pub result_reason: Option<ResultReason>,
    pub score1: u32,
    pub score2: u32,
    pub scheduled_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn involves(&self, competitor_id: &str) -> bool {
        self.competitor1_id == competitor_id || self.competitor2_id == competitor_id
    }

    /// Same two competitors, in either order
    pub fn has_pair(&self, a: &str, b: &str) -> bool {
        (self.competitor1_id == a && self.competitor2_id == b)
            || (self.competitor1_id == b && self.competitor2_id == a)
    }

    pub fn loser_id(&self) -> Option<&str> {
        let winner = self.winner_id.as_deref()?;
        if winner == self.competitor1_id {
            Some(&self.competitor2_id)
        } else if winner == self.competitor2_id {
            Some(&self.competitor1_id)
        } else {
            None
        }
    }
}

/// Input for creating a match record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatch {
    pub competition_id: Option<String>,
    pub slot: Option<SlotKey>,
    pub competitor1_id: String,
    pub competitor2_id: String,
    pub judge_id: Option<String>,
    pub category: String,
    pub duration_seconds: u32,
    pub scheduled_at: DateTime<Utc>,
}

/// Final result written back when a bout is finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResultUpdate {
    pub winner_id: String,
    pub result_reason: ResultReason,
    pub score1: u32,
    pub score2: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub competition_id: Option<String>,
    pub state: Option<MatchState>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl MatchFilter {
    pub fn for_competition(competition_id: &str) -> Self {
        Self {
            competition_id: Some(competition_id.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &MatchRecord) -> bool {
        if let Some(competition_id) = &self.competition_id {
            if record.competition_id.as_deref() != Some(competition_id.as_str()) {
                return false;
            }
        }
        if let Some(state) = self.state {
            if record.state != state {
                return false;
            }
        }
        true
    }
}
