//! Core type definitions for the tamago engine.
//!
//! All persisted types are serializable; the runtime-only pieces (hooks,
//! dice, the scheduler) live in [`crate::pet`] and [`crate::scheduler`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TamagoError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for a pet, stable across save/restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetId(pub Uuid);

impl PetId {
    /// Create a new random pet ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name and cosmetic attributes chosen at adoption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name. Never empty.
    pub name: String,
    /// Coat / scale colour.
    pub color: String,
    /// Coat pattern.
    pub pattern: String,
    /// Worn accessories, in the order they were listed.
    pub accessories: Vec<String>,
}

impl Profile {
    /// Name used when the player leaves the name blank.
    pub const DEFAULT_NAME: &'static str = "Pet";

    /// Build a profile. A blank name falls back to [`Self::DEFAULT_NAME`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        pattern: impl Into<String>,
        accessories: Vec<String>,
    ) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            Self::DEFAULT_NAME.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            name,
            color: color.into(),
            pattern: pattern.into(),
            accessories,
        }
    }
}

// ---------------------------------------------------------------------------
// Life stages
// ---------------------------------------------------------------------------

/// Ordered life stages. `Senior` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    /// Stage 0.
    Baby,
    /// Stage 1.
    Child,
    /// Stage 2.
    Teenager,
    /// Stage 3.
    Adult,
    /// Stage 4, no further growth.
    Senior,
}

impl LifeStage {
    /// All stages in order.
    pub const ALL: [LifeStage; 5] = [
        LifeStage::Baby,
        LifeStage::Child,
        LifeStage::Teenager,
        LifeStage::Adult,
        LifeStage::Senior,
    ];

    /// Index of the last stage.
    pub const LAST_INDEX: u8 = 4;

    /// Stage for an index, clamped to [`Self::LAST_INDEX`].
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index.min(Self::LAST_INDEX))]
    }

    /// Position of this stage in [`Self::ALL`].
    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Baby => "Baby",
            Self::Child => "Child",
            Self::Teenager => "Teenager",
            Self::Adult => "Adult",
            Self::Senior => "Senior",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// What the pet is fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    /// +30 hunger, +0.5 weight.
    Meal,
    /// +10 hunger, +5 happiness, +0.2 weight.
    Snack,
}

impl FromStr for FoodType {
    type Err = TamagoError;

    /// Accepts `meal` / `snack` in any case, or the menu digits `1` / `2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meal" | "1" => Ok(Self::Meal),
            "snack" | "2" => Ok(Self::Snack),
            _ => Err(TamagoError::InvalidFoodType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Coarse mood used by front ends to pick music or an idle animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    /// Happiness at or above 70 and not sick.
    Happy,
    /// Anything in between.
    Neutral,
    /// Sick, or happiness below 30.
    Sad,
}

impl Mood {
    /// Derive the mood from happiness and the sick flag.
    #[must_use]
    pub fn from_vitals(happiness: u8, sick: bool) -> Self {
        if sick || happiness < 30 {
            Self::Sad
        } else if happiness >= 70 {
            Self::Happy
        } else {
            Self::Neutral
        }
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Category of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    /// Informational, e.g. an action refused because the pet is gone.
    Info,
    /// Pet description shown after adoption.
    Characteristic,
    /// Result of feeding.
    Feeding,
    /// Result of sleeping.
    Sleep,
    /// Result of exercising.
    Exercise,
    /// Result of cleaning.
    Clean,
    /// Result of the guessing game.
    Game,
    /// The pet grew into a new stage.
    LifeStage,
    /// Special ability unlocked or used, or the species bonus action.
    SpecialAbility,
    /// The pet fell sick.
    Sickness,
    /// The pet was cured.
    Recovery,
    /// Something unprompted happened.
    RandomEvent,
    /// The pet died.
    Death,
}

/// A user-facing message produced by a command or a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Category.
    pub kind: NoticeKind,
    /// Human-readable text.
    pub message: String,
}

impl Notice {
    /// Create a notice.
    #[must_use]
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_index_round_trip_and_clamp() {
        for stage in LifeStage::ALL {
            assert_eq!(LifeStage::from_index(stage.index()), stage);
        }
        assert_eq!(LifeStage::from_index(200), LifeStage::Senior);
    }

    #[test]
    fn food_type_parsing() {
        assert_eq!("meal".parse::<FoodType>().expect("meal"), FoodType::Meal);
        assert_eq!(" Snack ".parse::<FoodType>().expect("snack"), FoodType::Snack);
        assert_eq!("2".parse::<FoodType>().expect("digit"), FoodType::Snack);
        assert!(matches!(
            "cake".parse::<FoodType>(),
            Err(TamagoError::InvalidFoodType(s)) if s == "cake"
        ));
    }

    #[test]
    fn blank_name_defaults() {
        let p = Profile::new("   ", "brown", "spotted", vec![]);
        assert_eq!(p.name, "Pet");
        let p = Profile::new(" Rex ", "brown", "spotted", vec![]);
        assert_eq!(p.name, "Rex");
    }

    #[test]
    fn mood_thresholds() {
        assert_eq!(Mood::from_vitals(80, false), Mood::Happy);
        assert_eq!(Mood::from_vitals(80, true), Mood::Sad);
        assert_eq!(Mood::from_vitals(50, false), Mood::Neutral);
        assert_eq!(Mood::from_vitals(29, false), Mood::Sad);
    }
}
