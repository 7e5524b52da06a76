//! # tamago-host: Session Layer for Tamago
//!
//! Everything a front end does around the engine, without drawing anything:
//!
//! - `adoption` parses the pet selection form (name, species, colour,
//!   pattern, comma-separated accessories)
//! - `session` resumes a saved pet or adopts a new one, keeps it ticking,
//!   deletes the save when the pet dies, and saves on shutdown
//! - `logging` installs the tracing subscriber
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │         front end (CLI, GUI)         │
//! │   status hook · death hook · input   │
//! └──────────────────┬───────────────────┘
//!                    ▼
//! ┌──────────────────────────────────────┐
//! │            tamago-host               │
//! │   Session ── Adoption ── logging     │
//! └──────────────────┬───────────────────┘
//!                    ▼
//! ┌──────────────────────────────────────┐
//! │            tamago-core               │
//! │  Pet · TickScheduler · PetStore      │
//! └──────────────────────────────────────┘
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adoption;
pub mod logging;
pub mod session;

pub use adoption::Adoption;
pub use logging::init_tracing;
pub use session::Session;
