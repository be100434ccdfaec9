use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::matches::SlotKey;
use crate::scoring::Side;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SlotState {
    Pending,
    InProgress,
    /// Terminal
    Finalized,
}

/// One bout position in the bracket tree.
///
/// Slot `(r, p)` for `r > 1` is fed by `(r-1, 2p-1)` on competitor1 and
/// `(r-1, 2p)` on competitor2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlot {
    pub round: u32,
    pub position: u32,
    pub competitor1: Option<String>,
    pub competitor2: Option<String>,
    pub assigned_judge: Option<String>,
    pub state: SlotState,
    pub winner: Option<String>,
    pub linked_match_id: Option<String>,
    pub final_score: Option<(u32, u32)>,
}

impl BracketSlot {
    pub fn new(round: u32, position: u32) -> Self {
        Self {
            round,
            position,
            competitor1: None,
            competitor2: None,
            assigned_judge: None,
            state: SlotState::Pending,
            winner: None,
            linked_match_id: None,
            final_score: None,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.round, self.position)
    }

    pub fn competitor(&self, side: Side) -> Option<&str> {
        match side {
            Side::Competitor1 => self.competitor1.as_deref(),
            Side::Competitor2 => self.competitor2.as_deref(),
        }
    }

    pub fn competitor_mut(&mut self, side: Side) -> &mut Option<String> {
        match side {
            Side::Competitor1 => &mut self.competitor1,
            Side::Competitor2 => &mut self.competitor2,
        }
    }

    pub fn has_competitor(&self, competitor_id: &str) -> bool {
        self.competitor1.as_deref() == Some(competitor_id)
            || self.competitor2.as_deref() == Some(competitor_id)
    }

    pub fn is_full(&self) -> bool {
        self.competitor1.is_some() && self.competitor2.is_some()
    }

    pub fn is_linked(&self) -> bool {
        self.linked_match_id.is_some()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == SlotState::Finalized
    }

    /// Manual edits are only allowed before a match exists for the slot
    pub fn is_editable(&self) -> bool {
        !self.is_finalized() && !self.is_linked()
    }

    /// Slot in the next round that this slot's winner moves into
    pub fn next_key(&self) -> SlotKey {
        SlotKey::new(self.round + 1, self.position.div_ceil(2))
    }

    /// Odd positions feed competitor1 of the next slot, even ones competitor2
    pub fn feeds_side(&self) -> Side {
        if self.position % 2 == 1 {
            Side::Competitor1
        } else {
            Side::Competitor2
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.round, self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1, SlotKey::new(2, 1), Side::Competitor1)]
    #[case(1, 2, SlotKey::new(2, 1), Side::Competitor2)]
    #[case(1, 3, SlotKey::new(2, 2), Side::Competitor1)]
    #[case(2, 4, SlotKey::new(3, 2), Side::Competitor2)]
    fn test_winner_routing(
        #[case] round: u32,
        #[case] position: u32,
        #[case] next: SlotKey,
        #[case] side: Side,
    ) {
        let slot = BracketSlot::new(round, position);
        assert_eq!(slot.next_key(), next);
        assert_eq!(slot.feeds_side(), side);
    }

    #[test]
    fn test_linked_slot_is_not_editable() {
        let mut slot = BracketSlot::new(1, 1);
        assert!(slot.is_editable());

        slot.linked_match_id = Some("m-1".to_string());
        assert!(!slot.is_editable());

        slot.clear();
        assert!(slot.is_editable());
        assert_eq!(slot.key(), SlotKey::new(1, 1));
    }
}
