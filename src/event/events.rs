use serde::{Deserialize, Serialize};

use crate::matches::SlotKey;
use crate::scoring::ResultReason;

/// Events published on a competition channel
///
/// Events represent facts that have already happened; subscribers react to
/// them (bracket refresh, scoreboard push) without the publisher knowing who
/// is listening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompetitionEvent {
    /// A bout result was written to the match store
    BoutFinalized {
        match_id: String,
        winner_id: String,
        reason: ResultReason,
        final_score: (u32, u32),
        recorded_by: Option<String>,
    },

    /// A bracket slot got its match record
    MatchCreated { match_id: String, slot: SlotKey },

    /// A winner moved into the next round
    SlotAdvanced {
        from: SlotKey,
        to: SlotKey,
        competitor_id: String,
    },

    /// The bracket was wiped
    BracketReset { deleted_matches: u64 },
}

impl CompetitionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CompetitionEvent::BoutFinalized { .. } => "bout_finalized",
            CompetitionEvent::MatchCreated { .. } => "match_created",
            CompetitionEvent::SlotAdvanced { .. } => "slot_advanced",
            CompetitionEvent::BracketReset { .. } => "bracket_reset",
        }
    }
}
