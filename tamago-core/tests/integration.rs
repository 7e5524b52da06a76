//! Integration tests: end-to-end pet lifecycles.
//!
//! Adoption, ticking, care commands, sickness, death, and save/restore,
//! driven through the public API only.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use tamago_core::config::{PersistenceConfig, SimulationConfig};
use tamago_core::meters::Meter;
use tamago_core::persistence::{JsonFileStore, MemoryStore, PetStore, SqliteStore};
use tamago_core::{
    FixedDice, FoodType, Hooks, LifeStage, Mood, NoticeKind, Pet, PetRecord, Profile,
    SchedulerState, SpeciesKind, TamagoConfig, TickScheduler,
};

fn profile(name: &str) -> Profile {
    Profile::new(name, "brown", "spotted", vec!["collar".into()])
}

fn fixed(record: PetRecord, hooks: Hooks) -> Pet {
    Pet::attach_with_dice(record, hooks, &SimulationConfig::default(), Box::new(FixedDice::new()))
}

// ---------------------------------------------------------------------------
// Ticking
// ---------------------------------------------------------------------------

#[test]
fn five_days_with_minimum_decay() {
    let pet = fixed(PetRecord::new(profile("Rex"), SpeciesKind::Dog), Hooks::inert());
    let mut notices = Vec::new();
    for _ in 0..5 {
        notices.extend(pet.tick().notices);
    }

    let s = pet.snapshot();
    assert_eq!(s.age, 5);
    assert_eq!(s.stage, LifeStage::Child);
    assert_eq!((s.hunger, s.happiness, s.cleanliness, s.health), (25, 40, 75, 100));
    assert!(s.alive);
    assert!(!s.sick);

    let kinds: Vec<_> = notices.iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NoticeKind::LifeStage));
    assert!(
        notices
            .iter()
            .any(|n| n.message == "Rex has grown to the Child stage!")
    );
}

#[test]
fn stage_caps_at_senior() {
    let pet = fixed(PetRecord::new(profile("Old Timer"), SpeciesKind::Cat), Hooks::inert());
    let mut stages = Vec::new();
    for _ in 0..40 {
        // Keep the cat alive through the long run.
        pet.feed(FoodType::Meal);
        pet.clean();
        pet.sleep();
        stages.extend(pet.tick().grew);
    }
    assert_eq!(
        stages,
        vec![LifeStage::Child, LifeStage::Teenager, LifeStage::Adult, LifeStage::Senior]
    );
    assert_eq!(pet.snapshot().stage, LifeStage::Senior);
}

#[test]
fn seeded_rules_are_reproducible() {
    let rules = SimulationConfig {
        rng_seed: Some(0x7A3A),
        ..SimulationConfig::default()
    };
    let record = PetRecord::new(profile("Twin"), SpeciesKind::Dragon);
    let a = Pet::attach(record.clone(), Hooks::inert(), &rules);
    let b = Pet::attach(record, Hooks::inert(), &rules);
    for _ in 0..12 {
        a.tick();
        b.tick();
        a.play("3").expect("valid guess");
        b.play("3").expect("valid guess");
    }
    assert_eq!(a.to_record(), b.to_record());
}

// ---------------------------------------------------------------------------
// Care commands
// ---------------------------------------------------------------------------

#[test]
fn ten_meals_fill_up_and_add_weight() {
    let pet = fixed(PetRecord::new(profile("Chonk"), SpeciesKind::Dog), Hooks::inert());
    for _ in 0..10 {
        let notices = pet.feed_named("meal").expect("meal is a food");
        assert_eq!(notices[0].kind, NoticeKind::Feeding);
    }
    let s = pet.snapshot();
    assert_eq!(s.hunger, 100);
    assert!((s.weight - 10.0).abs() < 1e-9);
}

#[test]
fn exercise_never_drops_weight_below_the_floor() {
    let pet = fixed(PetRecord::new(profile("Slim"), SpeciesKind::Unicorn), Hooks::inert());
    for _ in 0..20 {
        pet.exercise();
        pet.feed(FoodType::Snack);
        pet.feed(FoodType::Snack);
    }
    let s = pet.snapshot();
    assert!(s.weight >= 1.0);
    assert_eq!(s.training, 100);
}

#[test]
fn species_abilities_apply_their_effects() {
    let dog = fixed(PetRecord::new(profile("Rex"), SpeciesKind::Dog), Hooks::inert());
    dog.activate_special_ability();
    assert_eq!(dog.snapshot().happiness, 70);
    assert_eq!(dog.bonus_action_name(), "fetch_favorite_toy");
    dog.bonus_action();
    let s = dog.snapshot();
    assert_eq!((s.happiness, s.hunger, s.training), (80, 45, 5));
    assert!(s.extras.iter().any(|(k, v)| *k == "Fetches" && v == "1"));

    let cat = fixed(PetRecord::new(profile("Tom"), SpeciesKind::Cat), Hooks::inert());
    cat.activate_special_ability();
    assert_eq!(cat.snapshot().hunger, 65);

    let mut record = PetRecord::new(profile("Smaug"), SpeciesKind::Dragon);
    record.meters.set(Meter::Health, 50);
    let dragon = fixed(record, Hooks::inert());
    dragon.activate_special_ability();
    assert_eq!(dragon.snapshot().health, 75);

    let mut record = PetRecord::new(profile("Sparkle"), SpeciesKind::Unicorn);
    record.meters.set(Meter::Health, 50);
    let unicorn = fixed(record, Hooks::inert());
    unicorn.activate_special_ability();
    assert_eq!(unicorn.snapshot().health, 80);
}

#[test]
fn mood_follows_happiness_and_sickness() {
    let mut record = PetRecord::new(profile("Moody"), SpeciesKind::Cat);
    record.meters.set(Meter::Happiness, 80);
    let pet = fixed(record, Hooks::inert());
    assert_eq!(pet.snapshot().mood, Mood::Happy);

    let mut record = PetRecord::new(profile("Moody"), SpeciesKind::Cat);
    record.meters.set(Meter::Happiness, 10);
    assert_eq!(fixed(record, Hooks::inert()).snapshot().mood, Mood::Sad);

    let record = PetRecord::new(profile("Moody"), SpeciesKind::Cat);
    assert_eq!(fixed(record, Hooks::inert()).snapshot().mood, Mood::Neutral);
}

// ---------------------------------------------------------------------------
// Sickness
// ---------------------------------------------------------------------------

#[test]
fn dirty_pet_falls_sick_and_a_bath_cures_it() {
    let mut record = PetRecord::new(profile("Mud"), SpeciesKind::Dog);
    record.meters.set(Meter::Cleanliness, 20);
    let pet = Pet::attach_with_dice(
        record,
        Hooks::inert(),
        &SimulationConfig::default(),
        Box::new(FixedDice::new().with_coin(true)),
    );

    let report = pet.tick();
    assert!(report.fell_sick);
    assert!(
        report
            .notices
            .iter()
            .any(|n| n.message == "Oh no! Mud has gotten sick due to poor cleanliness!")
    );
    assert_eq!(pet.snapshot().health, 80);

    // Already sick: a second dirty tick does not stack the penalty.
    assert!(!pet.tick().fell_sick);
    assert_eq!(pet.snapshot().health, 80);

    let notices = pet.clean();
    assert!(notices.iter().any(|n| n.kind == NoticeKind::Recovery));
    let s = pet.snapshot();
    assert!(!s.sick);
    assert_eq!((s.health, s.cleanliness), (100, 100));
}

// ---------------------------------------------------------------------------
// Death
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn starving_pet_dies_and_the_scheduler_stops() {
    let deaths = Arc::new(Mutex::new(Vec::new()));
    let statuses = Arc::new(AtomicUsize::new(0));
    let (d, s) = (deaths.clone(), statuses.clone());
    let hooks = Hooks::new(
        move |_, _| {
            s.fetch_add(1, Ordering::SeqCst);
        },
        move |snap| d.lock().push(snap.clone()),
    );

    let mut record = PetRecord::new(profile("Rex"), SpeciesKind::Dog);
    record.meters.set(Meter::Hunger, 5);
    let pet = fixed(record, hooks);

    let mut scheduler = TickScheduler::new(Duration::from_secs(5));
    scheduler.start(pet.clone()).expect("start");
    tokio::time::sleep(Duration::from_secs(60)).await;
    scheduler.join().await;

    assert_eq!(scheduler.state(), SchedulerState::Stopped);
    let deaths = deaths.lock();
    assert_eq!(deaths.len(), 1);
    assert!(!deaths[0].alive);
    assert_eq!(deaths[0].hunger, 0);
    assert_eq!(statuses.load(Ordering::SeqCst), 1);

    let notices = pet.feed(FoodType::Meal);
    assert_eq!(notices[0].kind, NoticeKind::Info);
    assert_eq!(pet.snapshot().hunger, 0);
}

#[test]
fn death_is_permanent() {
    let mut record = PetRecord::new(profile("Ghost"), SpeciesKind::Unicorn);
    record.meters.set(Meter::Cleanliness, 0);
    let pet = fixed(record, Hooks::inert());
    assert!(pet.tick().died);
    pet.clean();
    pet.feed(FoodType::Meal);
    pet.tick();
    assert!(!pet.is_alive());
    assert_eq!(pet.snapshot().cleanliness, 0);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

fn well_worn_pet() -> Pet {
    let pet = fixed(
        PetRecord::new(
            Profile::new("Smaug", "red", "scaled", vec!["crown".into(), "cape".into()]),
            SpeciesKind::Dragon,
        ),
        Hooks::inert(),
    );
    for _ in 0..7 {
        pet.tick();
    }
    pet.feed(FoodType::Snack);
    pet.exercise();
    pet.bonus_action();
    pet.bonus_action();
    pet
}

fn assert_round_trip(store: &dyn PetStore) {
    let pet = well_worn_pet();
    let before = pet.to_record();
    store.save(&before).expect("save");

    let loaded = store.load().expect("load").expect("a save exists");
    assert_eq!(loaded, before);

    // Rebinding attaches fresh hooks; the pet carries on from where it was.
    let ticks = Arc::new(AtomicUsize::new(0));
    let t = ticks.clone();
    let restored = fixed(
        loaded,
        Hooks::new(
            move |_, _| {
                t.fetch_add(1, Ordering::SeqCst);
            },
            |_| {},
        ),
    );
    assert_eq!(restored.snapshot(), pet.snapshot());
    restored.tick();
    assert_eq!(restored.snapshot().age, 8);
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
    assert!(
        restored
            .snapshot()
            .extras
            .iter()
            .any(|(k, v)| *k == "Hoard" && v == "20 gold")
    );
}

#[test]
fn json_file_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_round_trip(&JsonFileStore::new(dir.path().join("saved_pet.json")));
}

#[test]
fn sqlite_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store =
        SqliteStore::open(dir.path().join("pets.db"), &PersistenceConfig::default()).expect("open");
    assert_round_trip(&store);
}

#[test]
fn memory_round_trip() {
    assert_round_trip(&MemoryStore::new());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn toml_rules_drive_the_simulation() {
    let config = TamagoConfig::from_toml(
        r#"
        [simulation]
        stage_every_ticks = 2
        random_event_one_in = 1000

        [simulation.decay.hunger]
        min = 1
        max = 1
        "#,
    )
    .expect("valid config");

    let pet = Pet::attach_with_dice(
        PetRecord::new(profile("Quick"), SpeciesKind::Cat),
        Hooks::inert(),
        &config.simulation,
        Box::new(FixedDice::new()),
    );
    for _ in 0..4 {
        pet.tick();
    }
    let s = pet.snapshot();
    assert_eq!(s.stage, LifeStage::Teenager);
    assert_eq!(s.hunger, 46);
}
