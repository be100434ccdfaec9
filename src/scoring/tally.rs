use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::Side;

/// Scoring techniques, ordered from least to most valuable
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Technique {
    Yuko,
    Wazaari,
    Ippon,
}

impl Technique {
    pub fn points(self) -> u32 {
        match self {
            Technique::Yuko => 1,
            Technique::Wazaari => 2,
            Technique::Ippon => 3,
        }
    }
}

/// Technique counts for one competitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub yuko: u32,
    pub wazaari: u32,
    pub ippon: u32,
}

impl ScoreTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, technique: Technique) {
        match technique {
            Technique::Yuko => self.yuko += 1,
            Technique::Wazaari => self.wazaari += 1,
            Technique::Ippon => self.ippon += 1,
        }
    }

    /// Undo the most significant score.
    ///
    /// The caller cannot choose the category: ippon goes first, then waza-ari,
    /// then yuko. Returns the technique that was removed, or `None` when the
    /// tally is already empty.
    pub fn subtract_point(&mut self) -> Option<Technique> {
        if self.ippon > 0 {
            self.ippon -= 1;
            Some(Technique::Ippon)
        } else if self.wazaari > 0 {
            self.wazaari -= 1;
            Some(Technique::Wazaari)
        } else if self.yuko > 0 {
            self.yuko -= 1;
            Some(Technique::Yuko)
        } else {
            None
        }
    }

    pub fn count(&self, technique: Technique) -> u32 {
        match technique {
            Technique::Yuko => self.yuko,
            Technique::Wazaari => self.wazaari,
            Technique::Ippon => self.ippon,
        }
    }

    pub fn total(&self) -> u32 {
        self.yuko * Technique::Yuko.points()
            + self.wazaari * Technique::Wazaari.points()
            + self.ippon * Technique::Ippon.points()
    }
}

/// Both competitors' tallies for one bout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutScore {
    pub competitor1: ScoreTally,
    pub competitor2: ScoreTally,
}

impl BoutScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self, side: Side) -> &ScoreTally {
        match side {
            Side::Competitor1 => &self.competitor1,
            Side::Competitor2 => &self.competitor2,
        }
    }

    fn tally_mut(&mut self, side: Side) -> &mut ScoreTally {
        match side {
            Side::Competitor1 => &mut self.competitor1,
            Side::Competitor2 => &mut self.competitor2,
        }
    }

    pub fn add_point(&mut self, side: Side, technique: Technique) {
        self.tally_mut(side).add_point(technique);
    }

    pub fn subtract_point(&mut self, side: Side) -> Option<Technique> {
        self.tally_mut(side).subtract_point()
    }

    pub fn total(&self, side: Side) -> u32 {
        self.tally(side).total()
    }

    /// (competitor1, competitor2)
    pub fn totals(&self) -> (u32, u32) {
        (self.competitor1.total(), self.competitor2.total())
    }
}
