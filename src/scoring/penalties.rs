use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The two penalty categories tracked on the judge console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PenaltyCategory {
    Category1,
    Category2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PenaltyFlag {
    /// C
    Chukoku,
    /// K
    Keikoku,
    /// HC
    HansokuChui,
    /// H
    Hansoku,
    /// Withdrawal disqualification
    Kiken,
    /// Conduct disqualification
    Shikkaku,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyFlags {
    pub chukoku: bool,
    pub keikoku: bool,
    pub hansoku_chui: bool,
    pub hansoku: bool,
    pub kiken: bool,
    pub shikkaku: bool,
}

impl PenaltyFlags {
    pub fn get(&self, flag: PenaltyFlag) -> bool {
        match flag {
            PenaltyFlag::Chukoku => self.chukoku,
            PenaltyFlag::Keikoku => self.keikoku,
            PenaltyFlag::HansokuChui => self.hansoku_chui,
            PenaltyFlag::Hansoku => self.hansoku,
            PenaltyFlag::Kiken => self.kiken,
            PenaltyFlag::Shikkaku => self.shikkaku,
        }
    }

    pub fn set(&mut self, flag: PenaltyFlag, value: bool) {
        let slot = match flag {
            PenaltyFlag::Chukoku => &mut self.chukoku,
            PenaltyFlag::Keikoku => &mut self.keikoku,
            PenaltyFlag::HansokuChui => &mut self.hansoku_chui,
            PenaltyFlag::Hansoku => &mut self.hansoku,
            PenaltyFlag::Kiken => &mut self.kiken,
            PenaltyFlag::Shikkaku => &mut self.shikkaku,
        };
        *slot = value;
    }
}

/// Penalty record for one competitor.
///
/// Advisory only. Setting a flag never changes the score or the winner; the
/// judge applies a disqualification by declaring the opponent the winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTracker {
    pub category1: PenaltyFlags,
    pub category2: PenaltyFlags,
}

impl PenaltyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(&mut self, category: PenaltyCategory, flag: PenaltyFlag, value: bool) {
        self.flags_mut(category).set(flag, value);
    }

    pub fn flag(&self, category: PenaltyCategory, flag: PenaltyFlag) -> bool {
        self.flags(category).get(flag)
    }

    pub fn flags(&self, category: PenaltyCategory) -> &PenaltyFlags {
        match category {
            PenaltyCategory::Category1 => &self.category1,
            PenaltyCategory::Category2 => &self.category2,
        }
    }

    fn flags_mut(&mut self, category: PenaltyCategory) -> &mut PenaltyFlags {
        match category {
            PenaltyCategory::Category1 => &mut self.category1,
            PenaltyCategory::Category2 => &mut self.category2,
        }
    }

    /// Whether either category carries a kiken or shikkaku flag
    pub fn has_disqualification(&self) -> bool {
        [&self.category1, &self.category2]
            .iter()
            .any(|flags| flags.kiken || flags.shikkaku)
    }
}
