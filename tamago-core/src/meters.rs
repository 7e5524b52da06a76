//! The pet's vitals and the rules that keep them in bounds.
//!
//! Every bounded meter is a [`Level`] in `0..=100`; all arithmetic goes
//! through [`Level::adjust`], so no code path can leave a meter out of
//! range. Weight is a real number with a floor of [`MIN_WEIGHT`] and no
//! ceiling.

use serde::{Deserialize, Serialize};

use crate::config::DecayConfig;
use crate::dice::Dice;
use crate::types::FoodType;

/// Upper bound of every [`Level`].
pub const MAX_LEVEL: u8 = 100;

/// Weight never drops below this (kg).
pub const MIN_WEIGHT: f64 = 1.0;

/// Weight of a newly adopted pet (kg).
pub const STARTING_WEIGHT: f64 = 5.0;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// A meter value clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Empty meter.
    pub const EMPTY: Self = Self(0);
    /// Full meter.
    pub const FULL: Self = Self(MAX_LEVEL);

    /// Create a level, clamping to `0..=100`.
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self(u8::try_from(value.clamp(0, i32::from(MAX_LEVEL))).unwrap_or(MAX_LEVEL))
    }

    /// Current value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Add `delta` (possibly negative) and clamp.
    pub fn adjust(&mut self, delta: i32) {
        *self = Self::new(i32::from(self.0).saturating_add(delta));
    }

    /// `true` at zero.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > MAX_LEVEL {
            Err(format!("meter value {value} exceeds {MAX_LEVEL}"))
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

// ---------------------------------------------------------------------------
// MeterSet
// ---------------------------------------------------------------------------

/// Names the bounded meters, for generic setters and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meter {
    /// How full the pet is. Zero is fatal.
    Hunger,
    /// Mood.
    Happiness,
    /// Zero is fatal.
    Health,
    /// Zero is fatal; low values cause sickness.
    Cleanliness,
    /// Skill from exercise.
    Training,
}

/// The pet's numeric vitals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSet {
    hunger: Level,
    happiness: Level,
    health: Level,
    cleanliness: Level,
    training: Level,
    weight: f64,
}

impl Default for MeterSet {
    /// Starting vitals of a newly adopted pet.
    fn default() -> Self {
        Self {
            hunger: Level::new(50),
            happiness: Level::new(50),
            health: Level::FULL,
            cleanliness: Level::FULL,
            training: Level::EMPTY,
            weight: STARTING_WEIGHT,
        }
    }
}

impl MeterSet {
    /// Read a meter.
    #[must_use]
    pub fn get(&self, meter: Meter) -> u8 {
        self.level(meter).get()
    }

    /// Overwrite a meter, clamping to `0..=100`.
    pub fn set(&mut self, meter: Meter, value: i32) {
        *self.level_mut(meter) = Level::new(value);
    }

    /// Add `delta` to a meter and clamp.
    pub fn adjust(&mut self, meter: Meter, delta: i32) {
        self.level_mut(meter).adjust(delta);
    }

    /// Hunger (higher is better fed).
    #[must_use]
    pub fn hunger(&self) -> u8 {
        self.hunger.get()
    }

    /// Happiness.
    #[must_use]
    pub fn happiness(&self) -> u8 {
        self.happiness.get()
    }

    /// Health.
    #[must_use]
    pub fn health(&self) -> u8 {
        self.health.get()
    }

    /// Cleanliness.
    #[must_use]
    pub fn cleanliness(&self) -> u8 {
        self.cleanliness.get()
    }

    /// Training.
    #[must_use]
    pub fn training(&self) -> u8 {
        self.training.get()
    }

    /// Weight in kg, never below [`MIN_WEIGHT`].
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Overwrite the weight, respecting the floor.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight.max(MIN_WEIGHT);
    }

    fn adjust_weight(&mut self, delta: f64) {
        self.set_weight(self.weight + delta);
    }

    /// `true` when any of the life-sustaining meters is empty.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.hunger.is_empty() || self.health.is_empty() || self.cleanliness.is_empty()
    }

    fn level(&self, meter: Meter) -> Level {
        match meter {
            Meter::Hunger => self.hunger,
            Meter::Happiness => self.happiness,
            Meter::Health => self.health,
            Meter::Cleanliness => self.cleanliness,
            Meter::Training => self.training,
        }
    }

    fn level_mut(&mut self, meter: Meter) -> &mut Level {
        match meter {
            Meter::Hunger => &mut self.hunger,
            Meter::Happiness => &mut self.happiness,
            Meter::Health => &mut self.health,
            Meter::Cleanliness => &mut self.cleanliness,
            Meter::Training => &mut self.training,
        }
    }

    // ------------------------------------------------------------------
    // Tick decay
    // ------------------------------------------------------------------

    /// Apply one tick of stochastic decay, each meter drawn independently.
    pub fn decay(&mut self, config: &DecayConfig, dice: &mut dyn Dice) {
        self.hunger.adjust(dice.roll(config.hunger.as_range()).saturating_neg());
        self.happiness.adjust(dice.roll(config.happiness.as_range()).saturating_neg());
        self.cleanliness.adjust(dice.roll(config.cleanliness.as_range()).saturating_neg());
        self.health.adjust(dice.roll(config.health.as_range()).saturating_neg());
    }

    // ------------------------------------------------------------------
    // Command deltas
    // ------------------------------------------------------------------

    /// Feed a meal or a snack.
    pub fn feed(&mut self, food: FoodType) {
        match food {
            FoodType::Meal => {
                self.hunger.adjust(30);
                self.adjust_weight(0.5);
            }
            FoodType::Snack => {
                self.hunger.adjust(10);
                self.happiness.adjust(5);
                self.adjust_weight(0.2);
            }
        }
    }

    /// Rest: restores health at the cost of hunger and cleanliness.
    pub fn sleep(&mut self) {
        self.hunger.adjust(-10);
        self.health.adjust(20);
        self.cleanliness.adjust(-5);
    }

    /// Exercise: builds training, burns weight.
    pub fn exercise(&mut self) {
        self.hunger.adjust(-10);
        self.happiness.adjust(5);
        self.training.adjust(10);
        self.adjust_weight(-0.5);
    }

    /// Bath: cleanliness to full, a little happiness.
    pub fn clean(&mut self) {
        self.cleanliness = Level::FULL;
        self.happiness.adjust(5);
    }

    /// One round of the guessing game.
    pub fn play(&mut self, won: bool) {
        self.happiness.adjust(if won { 15 } else { 5 });
        self.hunger.adjust(-5);
    }
}
