//! Randomness abstraction for the tick path.
//!
//! Every stochastic decision the engine makes (meter decay, the sickness
//! coin flip, random events, the guessing game) goes through a [`Dice`].
//! Production uses [`RandomDice`]; tests and replays use [`FixedDice`] to
//! script the outcome.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Source of random decisions.
///
/// Implementations must be `Send` so a pet can move onto the scheduler task.
pub trait Dice: Send {
    /// Uniform integer in `range` (inclusive on both ends).
    fn roll(&mut self, range: RangeInclusive<i32>) -> i32;

    /// A fair coin flip.
    fn coin(&mut self) -> bool;

    /// `true` with probability `1 / n`. `n <= 1` is always `true`.
    fn one_in(&mut self, n: u32) -> bool;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

// ---------------------------------------------------------------------------
// Real RNG
// ---------------------------------------------------------------------------

/// [`Dice`] backed by a [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Seed from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic dice for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, otherwise from entropy.
    #[must_use]
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Dice for RandomDice {
    fn roll(&mut self, range: RangeInclusive<i32>) -> i32 {
        if range.start() >= range.end() {
            return *range.start();
        }
        self.rng.gen_range(range)
    }

    fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn one_in(&mut self, n: u32) -> bool {
        if n <= 1 {
            return true;
        }
        self.rng.gen_range(0..n) == 0
    }

    fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick from an empty set");
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

// ---------------------------------------------------------------------------
// Scripted dice
// ---------------------------------------------------------------------------

/// Fully predictable [`Dice`].
///
/// Rolls always land on the low end of the range, so a tick applies the
/// minimum decay of every meter. The coin, the random-event trigger and
/// the picked index are fixed by the builder methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDice {
    coin: bool,
    event: bool,
    pick: usize,
}

impl FixedDice {
    /// Minimum rolls, coin lands `false`, no random events, picks index 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the result of every coin flip.
    #[must_use]
    pub fn with_coin(mut self, coin: bool) -> Self {
        self.coin = coin;
        self
    }

    /// Set whether every `one_in` check succeeds.
    #[must_use]
    pub fn with_events(mut self, event: bool) -> Self {
        self.event = event;
        self
    }

    /// Set the index returned by `pick` (clamped to the set size).
    #[must_use]
    pub fn with_pick(mut self, pick: usize) -> Self {
        self.pick = pick;
        self
    }
}

impl Dice for FixedDice {
    fn roll(&mut self, range: RangeInclusive<i32>) -> i32 {
        *range.start()
    }

    fn coin(&mut self) -> bool {
        self.coin
    }

    fn one_in(&mut self, _n: u32) -> bool {
        self.event
    }

    fn pick(&mut self, len: usize) -> usize {
        self.pick.min(len.saturating_sub(1))
    }
}
