use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::ScoringError;

/// Age categories with a fixed bout duration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoutCategory {
    Senior,
    Junior,
    Cadet,
}

impl BoutCategory {
    pub fn duration_seconds(self) -> u32 {
        match self {
            BoutCategory::Senior => 180,
            BoutCategory::Junior => 120,
            BoutCategory::Cadet => 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    Expired,
}

/// Countdown for one bout.
///
/// `tick` is driven from outside, once per elapsed second; the clock itself
/// holds no timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchClock {
    duration_seconds: u32,
    remaining_seconds: u32,
    state: ClockState,
}

impl MatchClock {
    pub fn new(duration_seconds: u32) -> Result<Self, ScoringError> {
        if duration_seconds == 0 {
            return Err(ScoringError::InvalidDuration);
        }

        Ok(Self {
            duration_seconds,
            remaining_seconds: duration_seconds,
            state: ClockState::Idle,
        })
    }

    pub fn for_category(category: BoutCategory) -> Self {
        Self {
            duration_seconds: category.duration_seconds(),
            remaining_seconds: category.duration_seconds(),
            state: ClockState::Idle,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    /// Idle/Paused -> Running. Returns whether the clock started.
    pub fn start(&mut self) -> bool {
        match self.state {
            ClockState::Idle | ClockState::Paused => {
                self.state = ClockState::Running;
                true
            }
            ClockState::Running | ClockState::Expired => false,
        }
    }

    /// Running -> Paused. Returns whether the clock paused.
    pub fn pause(&mut self) -> bool {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
            true
        } else {
            false
        }
    }

    pub fn toggle(&mut self) -> ClockState {
        if !self.pause() {
            self.start();
        }
        self.state
    }

    /// One elapsed second. No-op unless running.
    pub fn tick(&mut self) -> u32 {
        if self.state != ClockState::Running {
            return self.remaining_seconds;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.state = ClockState::Expired;
        }
        self.remaining_seconds
    }

    /// Back to Idle with `new_duration` seconds on the clock, or the category
    /// duration when none is given. Always stops the clock.
    pub fn reset(&mut self, new_duration: Option<u32>) -> Result<(), ScoringError> {
        let remaining = new_duration.unwrap_or(self.duration_seconds);
        if remaining == 0 {
            return Err(ScoringError::InvalidDuration);
        }

        self.remaining_seconds = remaining;
        self.state = ClockState::Idle;
        Ok(())
    }

    /// Switch to a new category duration. Only allowed while the clock is not
    /// running; the remaining time is reset to the new duration.
    pub fn set_duration(&mut self, duration_seconds: u32) -> Result<(), ScoringError> {
        if self.is_running() {
            return Err(ScoringError::ClockRunning);
        }
        if duration_seconds == 0 {
            return Err(ScoringError::InvalidDuration);
        }

        self.duration_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.state = ClockState::Idle;
        Ok(())
    }

    pub fn set_category(&mut self, category: BoutCategory) -> Result<(), ScoringError> {
        self.set_duration(category.duration_seconds())
    }
}
