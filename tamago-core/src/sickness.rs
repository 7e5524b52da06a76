//! Illness onset and cure.
//!
//! Once per tick, after decay: a pet that is not already sick and whose
//! cleanliness is below the threshold gets sick on a fair coin flip and
//! loses health. Cleaning a sick pet cures it and gives the health back.
//! Nothing else sets or clears the flag.

use crate::config::SimulationConfig;
use crate::dice::Dice;
use crate::meters::{Meter, MeterSet};

/// Sickness rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SicknessModel {
    threshold: u8,
    health_penalty: u8,
}

impl Default for SicknessModel {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl SicknessModel {
    /// Build from simulation settings.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            threshold: config.sickness_threshold,
            health_penalty: config.sickness_health_penalty,
        }
    }

    /// Maybe fall sick. Returns `true` on onset.
    pub fn check_onset(&self, meters: &mut MeterSet, sick: &mut bool, dice: &mut dyn Dice) -> bool {
        if *sick || meters.cleanliness() >= self.threshold {
            return false;
        }
        if !dice.coin() {
            return false;
        }
        *sick = true;
        meters.adjust(Meter::Health, -i32::from(self.health_penalty));
        true
    }

    /// Cure a sick pet. Returns `true` if it was sick.
    pub fn cure(&self, meters: &mut MeterSet, sick: &mut bool) -> bool {
        if !*sick {
            return false;
        }
        *sick = false;
        meters.adjust(Meter::Health, i32::from(self.health_penalty));
        true
    }
}
