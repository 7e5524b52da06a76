//! Read-only status projection handed to notification hooks and front ends.

use std::fmt;

use serde::Serialize;

use crate::species::SpeciesKind;
use crate::types::{LifeStage, Mood, PetId};

/// Everything a front end needs to draw the pet, captured atomically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Pet identity.
    pub id: PetId,
    /// Display name.
    pub name: String,
    /// Species.
    pub species: SpeciesKind,
    /// Current life stage.
    pub stage: LifeStage,
    /// Hunger meter.
    pub hunger: u8,
    /// Happiness meter.
    pub happiness: u8,
    /// Training meter.
    pub training: u8,
    /// Health meter.
    pub health: u8,
    /// Cleanliness meter.
    pub cleanliness: u8,
    /// Age in ticks ("days").
    pub age: u32,
    /// Weight in kg.
    pub weight: f64,
    /// Sick flag.
    pub sick: bool,
    /// Alive flag.
    pub alive: bool,
    /// Colour.
    pub color: String,
    /// Pattern.
    pub pattern: String,
    /// Accessories.
    pub accessories: Vec<String>,
    /// Species-specific attributes.
    pub extras: Vec<(&'static str, String)>,
    /// Derived mood.
    pub mood: Mood,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}'s Status:", self.name)?;
        writeln!(f, "Life Stage: {}", self.stage)?;
        writeln!(f, "Hunger: {}", self.hunger)?;
        writeln!(f, "Happiness: {}", self.happiness)?;
        writeln!(f, "Training: {}", self.training)?;
        writeln!(f, "Health: {}", self.health)?;
        writeln!(f, "Cleanliness: {}", self.cleanliness)?;
        writeln!(f, "Age: {} days", self.age)?;
        writeln!(f, "Weight: {:.2} kg", self.weight)?;
        writeln!(f, "Sick: {}", if self.sick { "Yes" } else { "No" })?;
        writeln!(f, "Color: {}", self.color)?;
        writeln!(f, "Pattern: {}", self.pattern)?;
        if self.accessories.is_empty() {
            writeln!(f, "Accessories: None")?;
        } else {
            writeln!(f, "Accessories: {}", self.accessories.join(", "))?;
        }
        for (label, value) in &self.extras {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}
