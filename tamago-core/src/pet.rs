//! The pet aggregate: persisted state plus the live handle that mutates it.
//!
//! [`PetRecord`] is the part that survives a restart. [`Pet`] is a cheap,
//! cloneable handle to a record that has been *attached* to its runtime
//! collaborators (hooks, dice, rules). Construction is two-phase on
//! purpose: a freshly deserialised record has no hooks at all, and it only
//! becomes usable once [`Pet::attach`] supplies them.
//!
//! ## Concurrency
//!
//! All mutation, whether from a scheduler tick or a foreground command,
//! happens under one mutex per pet. The snapshot handed to the hooks is
//! taken under that same lock, so a hook always sees a state produced by a
//! complete tick or command. Every tick and command first takes a second
//! gate, then the state lock, and releases the state lock before calling
//! the hooks while still holding the gate. Notifications therefore arrive
//! in commit order, and a hook may call [`Pet::snapshot`] while another
//! thread waits to run a command. A hook must not issue commands itself.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::dice::{Dice, RandomDice};
use crate::error::{Result, TamagoError};
use crate::events::{self, RandomEvent};
use crate::hooks::Hooks;
use crate::life_stage::LifeStageTracker;
use crate::meters::MeterSet;
use crate::sickness::SicknessModel;
use crate::snapshot::StatusSnapshot;
use crate::species::{SpeciesKind, Variant};
use crate::types::{FoodType, LifeStage, Mood, Notice, NoticeKind, PetId, Profile};

/// Lowest and highest number in the guessing game.
pub const GUESS_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

// ---------------------------------------------------------------------------
// PetRecord
// ---------------------------------------------------------------------------

/// Everything about a pet that is saved between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetRecord {
    /// Stable identity.
    pub id: PetId,
    /// Name and cosmetics.
    pub profile: Profile,
    /// Species and its own state.
    pub variant: Variant,
    /// Vitals.
    pub meters: MeterSet,
    /// Ticks lived.
    pub age: u32,
    /// Life stage index.
    pub stage: LifeStageTracker,
    /// Currently sick.
    pub sick: bool,
    /// `false` once the pet has died. Never flips back.
    pub alive: bool,
}

impl PetRecord {
    /// A newborn of the given species.
    #[must_use]
    pub fn new(profile: Profile, species: SpeciesKind) -> Self {
        Self {
            id: PetId::new(),
            profile,
            variant: species.hatch(),
            meters: MeterSet::default(),
            age: 0,
            stage: LifeStageTracker::new(),
            sick: false,
            alive: true,
        }
    }

    /// Species tag.
    #[must_use]
    pub fn species(&self) -> SpeciesKind {
        self.variant.species().kind()
    }

    /// Current life stage.
    #[must_use]
    pub fn life_stage(&self) -> LifeStage {
        self.stage.stage()
    }

    /// Project the current state for display.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        let species = self.variant.species();
        StatusSnapshot {
            id: self.id,
            name: self.profile.name.clone(),
            species: species.kind(),
            stage: self.life_stage(),
            hunger: self.meters.hunger(),
            happiness: self.meters.happiness(),
            training: self.meters.training(),
            health: self.meters.health(),
            cleanliness: self.meters.cleanliness(),
            age: self.age,
            weight: self.meters.weight(),
            sick: self.sick,
            alive: self.alive,
            color: self.profile.color.clone(),
            pattern: self.profile.pattern.clone(),
            accessories: self.profile.accessories.clone(),
            extras: species.extra_attributes(),
            mood: Mood::from_vitals(self.meters.happiness(), self.sick),
        }
    }
}

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// What one tick did.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// State after the tick.
    pub snapshot: StatusSnapshot,
    /// Messages produced by the tick.
    pub notices: Vec<Notice>,
    /// Stage reached this tick, if the pet grew.
    pub grew: Option<LifeStage>,
    /// The pet fell sick this tick.
    pub fell_sick: bool,
    /// Random event that fired, if any.
    pub event: Option<&'static RandomEvent>,
    /// The pet died on this tick.
    pub died: bool,
}

impl TickReport {
    /// `false` once the pet is dead; the scheduler stops on this.
    #[must_use]
    pub fn alive(&self) -> bool {
        self.snapshot.alive
    }
}

// ---------------------------------------------------------------------------
// Pet handle
// ---------------------------------------------------------------------------

struct PetCell {
    record: PetRecord,
    dice: Box<dyn Dice>,
}

struct Shared {
    cell: Mutex<PetCell>,
    notify_gate: Mutex<()>,
    hooks: Hooks,
    rules: SimulationConfig,
    sickness: SicknessModel,
    death_reported: AtomicBool,
    scheduled: AtomicBool,
}

/// A live pet. Clones share the same state.
#[derive(Clone)]
pub struct Pet {
    shared: Arc<Shared>,
}

impl fmt::Debug for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.shared.cell.lock();
        f.debug_struct("Pet")
            .field("id", &cell.record.id)
            .field("name", &cell.record.profile.name)
            .field("alive", &cell.record.alive)
            .finish_non_exhaustive()
    }
}

impl Pet {
    /// Attach a record to its runtime collaborators, with dice seeded from
    /// `rules.rng_seed`.
    #[must_use]
    pub fn attach(record: PetRecord, hooks: Hooks, rules: &SimulationConfig) -> Self {
        Self::attach_with_dice(
            record,
            hooks,
            rules,
            Box::new(RandomDice::from_seed_option(rules.rng_seed)),
        )
    }

    /// Attach with explicit dice.
    #[must_use]
    pub fn attach_with_dice(
        record: PetRecord,
        hooks: Hooks,
        rules: &SimulationConfig,
        dice: Box<dyn Dice>,
    ) -> Self {
        debug!(
            pet = %record.id,
            name = %record.profile.name,
            species = %record.species(),
            age = record.age,
            alive = record.alive,
            "Pet attached"
        );
        // A pet that was already dead when attached has nothing left to report.
        let death_reported = AtomicBool::new(!record.alive);
        Self {
            shared: Arc::new(Shared {
                cell: Mutex::new(PetCell { record, dice }),
                notify_gate: Mutex::new(()),
                hooks,
                rules: rules.clone(),
                sickness: SicknessModel::from_config(rules),
                death_reported,
                scheduled: AtomicBool::new(false),
            }),
        }
    }

    /// Adopt a newborn.
    #[must_use]
    pub fn adopt(profile: Profile, species: SpeciesKind, hooks: Hooks, rules: &SimulationConfig) -> Self {
        let record = PetRecord::new(profile, species);
        info!(pet = %record.id, name = %record.profile.name, species = %species, "Pet adopted");
        Self::attach(record, hooks, rules)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Stable identity.
    #[must_use]
    pub fn id(&self) -> PetId {
        self.shared.cell.lock().record.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.shared.cell.lock().record.profile.name.clone()
    }

    /// `false` once the pet has died.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.shared.cell.lock().record.alive
    }

    /// Consistent view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared.cell.lock().record.snapshot()
    }

    /// Copy of the persistable state.
    #[must_use]
    pub fn to_record(&self) -> PetRecord {
        self.shared.cell.lock().record.clone()
    }

    /// Rules this pet runs under.
    #[must_use]
    pub fn rules(&self) -> &SimulationConfig {
        &self.shared.rules
    }

    /// Species description, shown once after adoption.
    #[must_use]
    pub fn characteristic(&self) -> Notice {
        let cell = self.shared.cell.lock();
        let text = cell.record.variant.species().characteristic(&cell.record.profile.name);
        Notice::new(NoticeKind::Characteristic, text)
    }

    /// Name of this species' bonus action.
    #[must_use]
    pub fn bonus_action_name(&self) -> &'static str {
        self.shared.cell.lock().record.variant.species().bonus_action_name()
    }

    /// Mark this pet as driven by a scheduler. Returns `false` if one
    /// already claimed it.
    pub(crate) fn claim_scheduler(&self) -> bool {
        !self.shared.scheduled.swap(true, Ordering::AcqRel)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by one tick and notify the hooks.
    ///
    /// Order: meter decay, age, life stage, sickness, random event, death
    /// check. A dead pet is left untouched and no hook fires.
    pub fn tick(&self) -> TickReport {
        let shared = &*self.shared;
        let gate = shared.notify_gate.lock();
        let mut cell = shared.cell.lock();

        if !cell.record.alive {
            return TickReport {
                snapshot: cell.record.snapshot(),
                notices: Vec::new(),
                grew: None,
                fell_sick: false,
                event: None,
                died: false,
            };
        }

        let PetCell { record, dice } = &mut *cell;
        let rules = &shared.rules;
        let mut notices = Vec::new();

        record.meters.decay(&rules.decay, dice.as_mut());
        record.age = record.age.saturating_add(1);

        let grew = record.stage.advance_if_due(record.age, rules.stage_every_ticks);
        if let Some(stage) = grew {
            info!(pet = %record.id, age = record.age, stage = %stage, "Pet grew");
            notices.push(Notice::new(
                NoticeKind::LifeStage,
                format!("{} has grown to the {stage} stage!", record.profile.name),
            ));
            if let Some(text) = record.variant.species().special_ability(&record.profile.name, stage) {
                notices.push(Notice::new(NoticeKind::SpecialAbility, text));
            }
        }

        let fell_sick = shared
            .sickness
            .check_onset(&mut record.meters, &mut record.sick, dice.as_mut());
        if fell_sick {
            info!(pet = %record.id, health = record.meters.health(), "Pet fell sick");
            notices.push(Notice::new(
                NoticeKind::Sickness,
                format!(
                    "Oh no! {} has gotten sick due to poor cleanliness!",
                    record.profile.name
                ),
            ));
        }

        let event = events::maybe_fire(&mut record.meters, rules.random_event_one_in, dice.as_mut());
        if let Some(event) = event {
            debug!(pet = %record.id, event = event.description, "Random event");
            notices.push(Notice::new(
                NoticeKind::RandomEvent,
                format!("{} {}", record.profile.name, event.description),
            ));
        }

        let died = record.meters.is_depleted();
        if died {
            record.alive = false;
            info!(
                pet = %record.id,
                age = record.age,
                hunger = record.meters.hunger(),
                health = record.meters.health(),
                cleanliness = record.meters.cleanliness(),
                "Pet died"
            );
            notices.push(Notice::new(
                NoticeKind::Death,
                format!("Unfortunately, {} has passed away.", record.profile.name),
            ));
        }

        let snapshot = record.snapshot();
        drop(cell);

        shared.hooks.notify_status(&snapshot, &notices);
        if died && !shared.death_reported.swap(true, Ordering::AcqRel) {
            shared.hooks.notify_death(&snapshot);
        }
        drop(gate);

        TickReport {
            snapshot,
            notices,
            grew,
            fell_sick,
            event,
            died,
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Feed a meal or a snack.
    pub fn feed(&self, food: FoodType) -> Vec<Notice> {
        self.command("feed", |record, _| {
            record.meters.feed(food);
            let text = match food {
                FoodType::Meal => format!("{} enjoyed a hearty meal!", record.profile.name),
                FoodType::Snack => format!("{} loved the tasty snack!", record.profile.name),
            };
            vec![Notice::new(NoticeKind::Feeding, text)]
        })
    }

    /// Feed by menu name (`"meal"`, `"snack"`, `"1"`, `"2"`).
    ///
    /// # Errors
    /// [`TamagoError::InvalidFoodType`] for anything else; nothing changes.
    pub fn feed_named(&self, food: &str) -> Result<Vec<Notice>> {
        let food: FoodType = food.parse()?;
        Ok(self.feed(food))
    }

    /// Rest.
    pub fn sleep(&self) -> Vec<Notice> {
        self.command("sleep", |record, _| {
            record.meters.sleep();
            vec![Notice::new(
                NoticeKind::Sleep,
                format!("{} had a good rest!", record.profile.name),
            )]
        })
    }

    /// Exercise.
    pub fn exercise(&self) -> Vec<Notice> {
        self.command("exercise", |record, _| {
            record.meters.exercise();
            vec![Notice::new(
                NoticeKind::Exercise,
                format!("{} enjoyed the exercise!", record.profile.name),
            )]
        })
    }

    /// Bath time. Also cures a sick pet.
    pub fn clean(&self) -> Vec<Notice> {
        let sickness = self.shared.sickness;
        self.command("clean", move |record, _| {
            record.meters.clean();
            let mut notices = vec![Notice::new(
                NoticeKind::Clean,
                format!("You cleaned {}!", record.profile.name),
            )];
            if sickness.cure(&mut record.meters, &mut record.sick) {
                info!(pet = %record.id, health = record.meters.health(), "Pet cured");
                notices.push(Notice::new(
                    NoticeKind::Recovery,
                    format!("{} has been cured!", record.profile.name),
                ));
            }
            notices
        })
    }

    /// One round of the guessing game with the player's raw input.
    ///
    /// # Errors
    /// [`TamagoError::InvalidGuess`] if `guess` is not a whole number in
    /// [`GUESS_RANGE`]; the round is void and nothing changes.
    pub fn play(&self, guess: &str) -> Result<Vec<Notice>> {
        let parsed = guess
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|g| GUESS_RANGE.contains(g))
            .ok_or_else(|| TamagoError::InvalidGuess(guess.to_string()))?;

        Ok(self.command("play", move |record, dice| {
            let span = usize::from(GUESS_RANGE.end() - GUESS_RANGE.start()) + 1;
            // pick() < span <= 5, so the sum always fits in a u8.
            let secret = GUESS_RANGE.start() + u8::try_from(dice.pick(span)).unwrap_or(0);
            let won = parsed == secret;
            record.meters.play(won);
            let text = if won {
                "You guessed it! That was fun!".to_string()
            } else {
                format!("Oops! The correct number was {secret}. Maybe next time!")
            };
            vec![Notice::new(NoticeKind::Game, text)]
        }))
    }

    /// Use the species' special ability.
    pub fn activate_special_ability(&self) -> Vec<Notice> {
        self.command("special_ability", |record, _| {
            let text = record
                .variant
                .species()
                .special_ability_effect(&record.profile.name, &mut record.meters);
            vec![Notice::new(NoticeKind::SpecialAbility, text)]
        })
    }

    /// Perform the species' bonus action (fetch, sharpen claws, ...).
    pub fn bonus_action(&self) -> Vec<Notice> {
        self.command("bonus_action", |record, _| {
            let text = record
                .variant
                .species_mut()
                .bonus_action(&record.profile.name, &mut record.meters);
            vec![Notice::new(NoticeKind::SpecialAbility, text)]
        })
    }

    /// Run a foreground command under the pet lock, then notify.
    ///
    /// A dead pet gets an informational notice and no hook fires.
    fn command<F>(&self, action: &'static str, apply: F) -> Vec<Notice>
    where
        F: FnOnce(&mut PetRecord, &mut dyn Dice) -> Vec<Notice>,
    {
        let shared = &*self.shared;
        let gate = shared.notify_gate.lock();
        let mut cell = shared.cell.lock();

        if !cell.record.alive {
            debug!(pet = %cell.record.id, action, "Command ignored: pet is not alive");
            return vec![Notice::new(
                NoticeKind::Info,
                format!("{} is not able to perform this action.", cell.record.profile.name),
            )];
        }

        let PetCell { record, dice } = &mut *cell;
        let notices = apply(record, dice.as_mut());
        let snapshot = record.snapshot();
        debug!(pet = %snapshot.id, action, "Command applied");

        drop(cell);
        shared.hooks.notify_status(&snapshot, &notices);
        drop(gate);

        notices
    }
}
