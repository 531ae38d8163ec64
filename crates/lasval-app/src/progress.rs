//! Synthetic submission progress
//!
//! The request gives no real progress, so the indicator climbs by a fixed
//! step on every tick up to a ceiling and only reaches 100 on completion.

use crate::config::ProgressSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    percent: u8,
    step: u8,
    ceiling: u8,
}

impl Progress {
    pub fn new(step: u8, ceiling: u8) -> Self {
        Self {
            percent: 0,
            step,
            ceiling: ceiling.min(99),
        }
    }

    pub fn from_settings(settings: &ProgressSettings) -> Self {
        Self::new(settings.step_percent, settings.ceiling_percent)
    }

    /// Advance one tick, never past the ceiling. Returns the new value.
    pub fn advance(&mut self) -> u8 {
        if self.percent < self.ceiling {
            self.percent = self.percent.saturating_add(self.step).min(self.ceiling);
        }
        self.percent
    }

    pub fn complete(&mut self) {
        self.percent = 100;
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_complete(&self) -> bool {
        self.percent == 100
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::from_settings(&ProgressSettings::default())
    }
}
