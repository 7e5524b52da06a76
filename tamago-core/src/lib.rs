//! # Tamago Core Library
//!
//! Front-end-agnostic engine for a single virtual pet.
//!
//! A pet is a bundle of bounded vitals ([`MeterSet`]) that decay on every
//! tick, a life stage that advances with age, a sickness model driven by
//! cleanliness, and a small catalog of random events. Care commands (feed,
//! sleep, exercise, clean, play) push the vitals back up. When hunger,
//! health or cleanliness reaches zero the pet dies, permanently.
//!
//! - **Species**: Dog, Cat, Dragon, Unicorn, each with its own
//!   characteristic, special ability and bonus action ([`species`])
//! - **Ticks**: driven by a [`TickScheduler`] on a tokio runtime, or by
//!   calling [`Pet::tick`] directly
//! - **Hooks**: status and death notifications for whatever draws the pet
//!   ([`Hooks`])
//! - **Persistence**: JSON file, SQLite or in-memory save records
//!   ([`persistence`])
//!
//! Randomness is injected through [`Dice`], so every rule can be tested
//! deterministically.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dice;
pub mod error;
pub mod events;
pub mod hooks;
pub mod life_stage;
pub mod meters;
pub mod persistence;
pub mod pet;
pub mod scheduler;
pub mod sickness;
pub mod snapshot;
pub mod species;
pub mod types;

pub use config::TamagoConfig;
pub use dice::{Dice, FixedDice, RandomDice};
pub use error::TamagoError;
pub use hooks::Hooks;
pub use meters::MeterSet;
pub use persistence::PetStore;
pub use pet::{Pet, PetRecord, TickReport};
pub use scheduler::{SchedulerState, TickScheduler};
pub use snapshot::StatusSnapshot;
pub use species::{Species, SpeciesKind, Variant};
pub use types::*;
