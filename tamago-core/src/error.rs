//! Error types for the tamago engine.

use thiserror::Error;

/// Top-level error type for all tamago operations.
#[derive(Error, Debug)]
pub enum TamagoError {
    /// `feed` was called with something other than a meal or a snack.
    #[error("Invalid food type: {0:?} (expected \"meal\" or \"snack\")")]
    InvalidFoodType(String),

    /// The guessing minigame received a non-numeric or out-of-range guess.
    #[error("Invalid guess: {0:?} (expected a whole number from 1 to 5)")]
    InvalidGuess(String),

    /// The adoption step named a species the engine does not know.
    #[error("Unknown species: {0:?}")]
    UnknownSpecies(String),

    /// The tick scheduler was asked to do something its state forbids.
    #[error("Scheduler error: {0}")]
    SchedulerState(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TamagoError {
    fn from(err: serde_json::Error) -> Self {
        TamagoError::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, TamagoError>;
