//! Unprompted random events.
//!
//! Each tick, independently of sickness, one event in [`CATALOG`] may fire
//! with probability `1 / random_event_one_in`. The event is picked
//! uniformly and its deltas are applied with the usual clamping.

use serde::Serialize;

use crate::dice::Dice;
use crate::meters::{Meter, MeterSet};

/// One entry of the event catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RandomEvent {
    /// Completes the sentence "`<name>` ...".
    pub description: &'static str,
    /// Change applied to happiness.
    pub happiness: i32,
    /// Change applied to health.
    pub health: i32,
}

/// Everything that can happen to a pet on its own.
pub static CATALOG: [RandomEvent; 4] = [
    RandomEvent {
        description: "found a treasure!",
        happiness: 20,
        health: 0,
    },
    RandomEvent {
        description: "got scared by a thunderstorm.",
        happiness: -15,
        health: 0,
    },
    RandomEvent {
        description: "made a new friend!",
        happiness: 10,
        health: 0,
    },
    RandomEvent {
        description: "ate something bad.",
        happiness: 0,
        health: -20,
    },
];

impl RandomEvent {
    /// Apply this event's deltas.
    pub fn apply(&self, meters: &mut MeterSet) {
        meters.adjust(Meter::Happiness, self.happiness);
        meters.adjust(Meter::Health, self.health);
    }
}

/// Roll for an event and apply it. Returns the event that fired, if any.
pub fn maybe_fire(
    meters: &mut MeterSet,
    one_in: u32,
    dice: &mut dyn Dice,
) -> Option<&'static RandomEvent> {
    if !dice.one_in(one_in) {
        return None;
    }
    let event = &CATALOG[dice.pick(CATALOG.len())];
    event.apply(meters);
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{FixedDice, RandomDice};

    #[test]
    fn no_event_without_trigger() {
        let mut meters = MeterSet::default();
        assert!(maybe_fire(&mut meters, 5, &mut FixedDice::new()).is_none());
        assert_eq!(meters, MeterSet::default());
    }

    #[test]
    fn treasure_raises_happiness() {
        let mut meters = MeterSet::default();
        let event = maybe_fire(&mut meters, 5, &mut FixedDice::new().with_events(true))
            .expect("event fires");
        assert_eq!(event.description, "found a treasure!");
        assert_eq!(meters.happiness(), 70);
    }

    #[test]
    fn bad_food_hurts_and_clamps() {
        let mut meters = MeterSet::default();
        meters.set(Meter::Health, 5);
        let mut dice = FixedDice::new().with_events(true).with_pick(3);
        let event = maybe_fire(&mut meters, 5, &mut dice).expect("event fires");
        assert_eq!(event.health, -20);
        assert_eq!(meters.health(), 0);
    }

    #[test]
    fn roughly_one_tick_in_five() {
        let mut dice = RandomDice::seeded(11);
        let mut meters = MeterSet::default();
        let fired = (0..10_000)
            .filter(|_| maybe_fire(&mut meters, 5, &mut dice).is_some())
            .count();
        assert!((1_600..2_400).contains(&fired), "fired {fired} times");
    }
}
