//! Pet species and their capabilities.
//!
//! Every species implements [`Species`]: flavour text, the stage-unlock
//! messages, the player-triggered special ability, and one bonus action
//! with its own persisted state. The engine only ever talks to
//! `&dyn Species`; [`Variant`] owns the concrete state and is the single
//! place that knows which species is which.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TamagoError;
use crate::meters::{Level, Meter, MeterSet};
use crate::types::LifeStage;

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// Behaviour every pet species supplies.
pub trait Species: Send + Sync + fmt::Debug {
    /// Which species this is.
    fn kind(&self) -> SpeciesKind;

    /// One-line description shown after adoption.
    fn characteristic(&self, name: &str) -> String;

    /// Message for reaching `stage`, if that stage unlocks something.
    ///
    /// Purely observational; it never touches the meters.
    fn special_ability(&self, name: &str, stage: LifeStage) -> Option<String>;

    /// Apply the player-triggered special ability and describe it.
    fn special_ability_effect(&self, name: &str, meters: &mut MeterSet) -> String;

    /// Machine name of the bonus action, e.g. `fetch_favorite_toy`.
    fn bonus_action_name(&self) -> &'static str;

    /// Perform the bonus action and describe it.
    fn bonus_action(&mut self, name: &str, meters: &mut MeterSet) -> String;

    /// Species-specific attributes for the status display.
    fn extra_attributes(&self) -> Vec<(&'static str, String)>;
}

/// Species tag, used for adoption menus and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesKind {
    /// Loyal and playful.
    Dog,
    /// Independent and curious.
    Cat,
    /// Fierce and majestic.
    Dragon,
    /// Magical and graceful.
    Unicorn,
}

impl SpeciesKind {
    /// All species, in menu order.
    pub const ALL: [SpeciesKind; 4] = [Self::Dog, Self::Cat, Self::Dragon, Self::Unicorn];

    /// Fresh species state for a newly adopted pet.
    #[must_use]
    pub fn hatch(self) -> Variant {
        match self {
            Self::Dog => Variant::Dog(Dog::default()),
            Self::Cat => Variant::Cat(Cat::default()),
            Self::Dragon => Variant::Dragon(Dragon::default()),
            Self::Unicorn => Variant::Unicorn(Unicorn::default()),
        }
    }
}

impl fmt::Display for SpeciesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Dragon => "Dragon",
            Self::Unicorn => "Unicorn",
        };
        f.write_str(s)
    }
}

impl FromStr for SpeciesKind {
    type Err = TamagoError;

    /// Accepts the species name in any case, or its 1-based menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" | "1" => Ok(Self::Dog),
            "cat" | "2" => Ok(Self::Cat),
            "dragon" | "3" => Ok(Self::Dragon),
            "unicorn" | "4" => Ok(Self::Unicorn),
            _ => Err(TamagoError::UnknownSpecies(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Variant: owned species state
// ---------------------------------------------------------------------------

/// Concrete species state, persisted with the pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "species")]
pub enum Variant {
    /// A dog.
    Dog(Dog),
    /// A cat.
    Cat(Cat),
    /// A dragon.
    Dragon(Dragon),
    /// A unicorn.
    Unicorn(Unicorn),
}

impl Variant {
    /// Borrow as the capability trait.
    #[must_use]
    pub fn species(&self) -> &dyn Species {
        match self {
            Self::Dog(s) => s,
            Self::Cat(s) => s,
            Self::Dragon(s) => s,
            Self::Unicorn(s) => s,
        }
    }

    /// Mutably borrow as the capability trait.
    pub fn species_mut(&mut self) -> &mut dyn Species {
        match self {
            Self::Dog(s) => s,
            Self::Cat(s) => s,
            Self::Dragon(s) => s,
            Self::Unicorn(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// Dog
// ---------------------------------------------------------------------------

/// Dog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    /// What it fetches.
    pub favorite_toy: String,
    /// Number of successful fetches.
    pub fetch_count: u32,
}

impl Default for Dog {
    fn default() -> Self {
        Self {
            favorite_toy: "tennis ball".to_string(),
            fetch_count: 0,
        }
    }
}

impl Species for Dog {
    fn kind(&self) -> SpeciesKind {
        SpeciesKind::Dog
    }

    fn characteristic(&self, name: &str) -> String {
        format!("{name} is a loyal and playful dog!")
    }

    fn special_ability(&self, name: &str, stage: LifeStage) -> Option<String> {
        match stage {
            LifeStage::Teenager => Some(format!("{name} learned to fetch!")),
            LifeStage::Adult => Some(format!("{name} can now guard the house!")),
            LifeStage::Senior => Some(format!("{name} enjoys leisurely walks.")),
            LifeStage::Baby | LifeStage::Child => None,
        }
    }

    fn special_ability_effect(&self, name: &str, meters: &mut MeterSet) -> String {
        meters.adjust(Meter::Happiness, 20);
        format!("{name} fetches a rare item for you!")
    }

    fn bonus_action_name(&self) -> &'static str {
        "fetch_favorite_toy"
    }

    fn bonus_action(&mut self, name: &str, meters: &mut MeterSet) -> String {
        self.fetch_count = self.fetch_count.saturating_add(1);
        meters.adjust(Meter::Happiness, 10);
        meters.adjust(Meter::Hunger, -5);
        meters.adjust(Meter::Training, 5);
        format!("{name} brings back the {} with a wagging tail!", self.favorite_toy)
    }

    fn extra_attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Favorite Toy", self.favorite_toy.clone()),
            ("Fetches", self.fetch_count.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Cat
// ---------------------------------------------------------------------------

/// Cat state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    /// How sharp the claws are, `0..=100`.
    pub claw_sharpness: Level,
}

impl Default for Cat {
    fn default() -> Self {
        Self {
            claw_sharpness: Level::new(50),
        }
    }
}

impl Species for Cat {
    fn kind(&self) -> SpeciesKind {
        SpeciesKind::Cat
    }

    fn characteristic(&self, name: &str) -> String {
        format!("{name} is an independent and curious cat!")
    }

    fn special_ability(&self, name: &str, stage: LifeStage) -> Option<String> {
        match stage {
            LifeStage::Teenager => Some(format!("{name} learned to climb trees!")),
            LifeStage::Adult => Some(format!("{name} loves to nap in the sun!")),
            LifeStage::Senior => Some(format!("{name} appreciates quiet companionship.")),
            LifeStage::Baby | LifeStage::Child => None,
        }
    }

    fn special_ability_effect(&self, name: &str, meters: &mut MeterSet) -> String {
        meters.adjust(Meter::Hunger, 15);
        format!("{name} catches a pesky mouse!")
    }

    fn bonus_action_name(&self) -> &'static str {
        "sharpen_claws"
    }

    fn bonus_action(&mut self, name: &str, meters: &mut MeterSet) -> String {
        self.claw_sharpness.adjust(20);
        meters.adjust(Meter::Happiness, 5);
        format!("{name} sharpens their claws on the scratching post.")
    }

    fn extra_attributes(&self) -> Vec<(&'static str, String)> {
        vec![("Claw Sharpness", self.claw_sharpness.get().to_string())]
    }
}

// ---------------------------------------------------------------------------
// Dragon
// ---------------------------------------------------------------------------

/// Dragon state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dragon {
    /// Gold coins hoarded so far.
    pub hoard: u32,
}

impl Species for Dragon {
    fn kind(&self) -> SpeciesKind {
        SpeciesKind::Dragon
    }

    fn characteristic(&self, name: &str) -> String {
        format!("{name} is a fierce and majestic dragon!")
    }

    fn special_ability(&self, name: &str, stage: LifeStage) -> Option<String> {
        match stage {
            LifeStage::Teenager => Some(format!("{name} can breathe small flames!")),
            LifeStage::Adult => Some(format!("{name} can fly high in the sky!")),
            LifeStage::Senior => Some(format!("{name} is a wise and ancient creature.")),
            LifeStage::Baby | LifeStage::Child => None,
        }
    }

    fn special_ability_effect(&self, name: &str, meters: &mut MeterSet) -> String {
        meters.adjust(Meter::Health, 25);
        format!("{name} breathes fire to scare away threats!")
    }

    fn bonus_action_name(&self) -> &'static str {
        "hoard_treasure"
    }

    fn bonus_action(&mut self, name: &str, meters: &mut MeterSet) -> String {
        self.hoard = self.hoard.saturating_add(10);
        meters.adjust(Meter::Happiness, 10);
        format!("{name} adds ten gold coins to the hoard ({} total).", self.hoard)
    }

    fn extra_attributes(&self) -> Vec<(&'static str, String)> {
        vec![("Hoard", format!("{} gold", self.hoard))]
    }
}

// ---------------------------------------------------------------------------
// Unicorn
// ---------------------------------------------------------------------------

/// Unicorn state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unicorn {
    /// Horn shine, `0..=100`.
    pub horn_shine: Level,
}

impl Default for Unicorn {
    fn default() -> Self {
        Self {
            horn_shine: Level::new(50),
        }
    }
}

impl Species for Unicorn {
    fn kind(&self) -> SpeciesKind {
        SpeciesKind::Unicorn
    }

    fn characteristic(&self, name: &str) -> String {
        format!("{name} is a magical and graceful unicorn!")
    }

    fn special_ability(&self, name: &str, stage: LifeStage) -> Option<String> {
        match stage {
            LifeStage::Teenager => Some(format!("{name} can grant small wishes!")),
            LifeStage::Adult => Some(format!("{name} purifies water sources!")),
            LifeStage::Senior => Some(format!("{name} shares ancient wisdom.")),
            LifeStage::Baby | LifeStage::Child => None,
        }
    }

    fn special_ability_effect(&self, name: &str, meters: &mut MeterSet) -> String {
        meters.adjust(Meter::Health, 30);
        format!("{name} uses magic to heal you!")
    }

    fn bonus_action_name(&self) -> &'static str {
        "polish_horn"
    }

    fn bonus_action(&mut self, name: &str, meters: &mut MeterSet) -> String {
        self.horn_shine.adjust(20);
        meters.adjust(Meter::Happiness, 5);
        meters.adjust(Meter::Cleanliness, 5);
        format!("{name}'s horn sparkles after a good polish.")
    }

    fn extra_attributes(&self) -> Vec<(&'static str, String)> {
        vec![("Horn Shine", self.horn_shine.get().to_string())]
    }
}
