//! Life-stage state machine.
//!
//! Baby → Child → Teenager → Adult → Senior. The stage index only ever
//! moves forward, one step at a time, on ticks where the pet's age is a
//! positive multiple of the configured interval. Senior is terminal.

use serde::{Deserialize, Serialize};

use crate::types::LifeStage;

/// Tracks the monotonically increasing stage index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LifeStageTracker {
    index: u8,
}

impl LifeStageTracker {
    /// Start as a baby.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stage.
    #[must_use]
    pub fn stage(self) -> LifeStage {
        LifeStage::from_index(self.index)
    }

    /// Current index, `0..=4`.
    #[must_use]
    pub fn index(self) -> u8 {
        self.index
    }

    /// `true` once the terminal stage is reached.
    #[must_use]
    pub fn is_final(self) -> bool {
        self.index >= LifeStage::LAST_INDEX
    }

    /// Advance one stage if `age` is due for growth.
    ///
    /// Returns the new stage when it changed. The caller fires the
    /// species' stage hook exactly once per returned stage.
    pub fn advance_if_due(&mut self, age: u32, every: u32) -> Option<LifeStage> {
        if age == 0 || every == 0 || age % every != 0 || self.is_final() {
            return None;
        }
        self.index += 1;
        Some(self.stage())
    }
}

impl TryFrom<u8> for LifeStageTracker {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        if index > LifeStage::LAST_INDEX {
            Err(format!("life stage index {index} exceeds {}", LifeStage::LAST_INDEX))
        } else {
            Ok(Self { index })
        }
    }
}

impl From<LifeStageTracker> for u8 {
    fn from(tracker: LifeStageTracker) -> Self {
        tracker.index
    }
}
