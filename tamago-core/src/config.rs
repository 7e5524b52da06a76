//! Configuration for the tamago engine.
//!
//! Maps directly to `tamago.toml`. Every field has a default, so an empty
//! file (or no file at all) yields the classic rules: a tick every five
//! seconds, a new life stage every five ticks, a random event one tick in
//! five, and sickness below 30 cleanliness.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::meters::MAX_LEVEL;

/// Top-level tamago configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TamagoConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Tick rules and timing.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Save-record settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl TamagoConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `TamagoError::Config` if the TOML is invalid or describes
    /// impossible rules (see [`SimulationConfig::validate`]).
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| crate::TamagoError::Config(e.to_string()))?;
        config.simulation.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Rules applied on every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Milliseconds between ticks.
    #[serde(default = "default_5000")]
    pub tick_interval_ms: u64,
    /// The pet grows one life stage whenever its age is a positive multiple of this.
    #[serde(default = "default_5")]
    pub stage_every_ticks: u32,
    /// A random event fires with probability `1 / random_event_one_in`.
    #[serde(default = "default_5")]
    pub random_event_one_in: u32,
    /// Cleanliness strictly below this may make the pet sick.
    #[serde(default = "default_30")]
    pub sickness_threshold: u8,
    /// Health lost on falling sick, and regained when cured.
    #[serde(default = "default_20")]
    pub sickness_health_penalty: u8,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Per-tick meter decay ranges.
    #[serde(default)]
    pub decay: DecayConfig,
}

impl SimulationConfig {
    /// Tick interval as a [`Duration`].
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Reject rules the engine cannot run.
    ///
    /// # Errors
    /// Returns `TamagoError::Config` for a zero interval, zero divisors, an
    /// inverted decay range, or a decay range outside `0..=MAX_LEVEL`.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(crate::TamagoError::Config(
                "tick_interval_ms must be positive".into(),
            ));
        }
        if self.stage_every_ticks == 0 || self.random_event_one_in == 0 {
            return Err(crate::TamagoError::Config(
                "stage_every_ticks and random_event_one_in must be positive".into(),
            ));
        }
        for (name, range) in [
            ("hunger", self.decay.hunger),
            ("happiness", self.decay.happiness),
            ("cleanliness", self.decay.cleanliness),
            ("health", self.decay.health),
        ] {
            if range.min > range.max {
                return Err(crate::TamagoError::Config(format!(
                    "decay.{name}: min {} exceeds max {}",
                    range.min, range.max
                )));
            }
            if range.min < 0 || range.max > i32::from(MAX_LEVEL) {
                return Err(crate::TamagoError::Config(format!(
                    "decay.{name}: {}..={} is outside 0..={MAX_LEVEL}",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5000,
            stage_every_ticks: 5,
            random_event_one_in: 5,
            sickness_threshold: 30,
            sickness_health_penalty: 20,
            rng_seed: None,
            decay: DecayConfig::default(),
        }
    }
}

/// An inclusive integer range, e.g. `{ min = 5, max = 10 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayRange {
    /// Smallest amount removed per tick.
    pub min: i32,
    /// Largest amount removed per tick.
    pub max: i32,
}

impl DecayRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// As a std range, for [`crate::dice::Dice::roll`].
    #[must_use]
    pub fn as_range(self) -> RangeInclusive<i32> {
        self.min..=self.max
    }
}

/// How much each meter loses per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Hunger loss per tick.
    #[serde(default = "default_hunger_decay")]
    pub hunger: DecayRange,
    /// Happiness loss per tick.
    #[serde(default = "default_happiness_decay")]
    pub happiness: DecayRange,
    /// Cleanliness loss per tick.
    #[serde(default = "default_cleanliness_decay")]
    pub cleanliness: DecayRange,
    /// Health loss per tick.
    #[serde(default = "default_health_decay")]
    pub health: DecayRange,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            hunger: default_hunger_decay(),
            happiness: default_happiness_decay(),
            cleanliness: default_cleanliness_decay(),
            health: default_health_decay(),
        }
    }
}

/// Save-record configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend: "json", "sqlite" or "memory".
    #[serde(default = "default_json")]
    pub backend: String,
    /// File path for the "json" and "sqlite" backends.
    #[serde(default = "default_save_path")]
    pub path: PathBuf,
    /// Save slot name, so several sessions can share one SQLite file.
    #[serde(default = "default_slot")]
    pub slot: String,
    /// Use WAL mode for the SQLite backend.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Store a CRC-32 next to SQLite records to detect corruption.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: "json".to_string(),
            path: default_save_path(),
            slot: "default".to_string(),
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_json() -> String { "json".to_string() }
fn default_slot() -> String { "default".to_string() }
fn default_save_path() -> PathBuf { PathBuf::from("saved_pet.json") }
fn default_5() -> u32 { 5 }
fn default_20() -> u8 { 20 }
fn default_30() -> u8 { 30 }
fn default_5000() -> u64 { 5000 }
fn default_hunger_decay() -> DecayRange { DecayRange::new(5, 10) }
fn default_happiness_decay() -> DecayRange { DecayRange::new(2, 5) }
fn default_cleanliness_decay() -> DecayRange { DecayRange::new(5, 10) }
fn default_health_decay() -> DecayRange { DecayRange::new(0, 2) }
