//! One play session: resume or adopt a pet, keep it ticking, save on exit.
//!
//! ```text
//!   open ──▶ resume ──(live save)──▶ playing ──▶ shutdown (save if alive)
//!              │                        ▲  │
//!              └──(no save / dead)──▶ adopt └──(pet dies)──▶ save deleted
//! ```
//!
//! The session owns the store and the scheduler. Callers only ever see the
//! [`Pet`] handle and the hooks they supplied; the death hook is wrapped so
//! the save record is gone before the caller hears about the death.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tamago_core::error::Result;
use tamago_core::persistence::{self, PetStore};
use tamago_core::{Hooks, Notice, Pet, SchedulerState, TamagoConfig, TickScheduler};

use crate::adoption::Adoption;

/// A running session.
pub struct Session {
    store: Arc<dyn PetStore>,
    config: TamagoConfig,
    pet: Option<Pet>,
    scheduler: Option<TickScheduler>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.store.backend())
            .field("pet", &self.pet)
            .field("scheduler", &self.scheduler_state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session on an existing store.
    #[must_use]
    pub fn open(store: Arc<dyn PetStore>, config: TamagoConfig) -> Self {
        debug!(backend = store.backend(), "Session opened");
        Self {
            store,
            config,
            pet: None,
            scheduler: None,
        }
    }

    /// Open a session on the store named by `config.persistence`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn from_config(config: TamagoConfig) -> Result<Self> {
        let store: Arc<dyn PetStore> = Arc::from(persistence::open_store(&config.persistence)?);
        Ok(Self::open(store, config))
    }

    /// The pet currently in play.
    #[must_use]
    pub fn pet(&self) -> Option<&Pet> {
        self.pet.as_ref()
    }

    /// State of the current scheduler, if one was started.
    #[must_use]
    pub fn scheduler_state(&self) -> Option<SchedulerState> {
        self.scheduler.as_ref().map(TickScheduler::state)
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TamagoConfig {
        &self.config
    }

    /// Pick up the saved pet, if there is a live one.
    ///
    /// An unreadable save is logged and treated as no save. A save holding
    /// a dead pet is deleted. Otherwise the pet is attached to `hooks` and
    /// starts ticking.
    ///
    /// # Errors
    ///
    /// Returns an error if a dead pet's save cannot be deleted, or if the
    /// scheduler cannot start (e.g. no tokio runtime).
    pub fn resume(&mut self, hooks: Hooks) -> Result<Option<Pet>> {
        let record = match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(backend = self.store.backend(), error = %e, "Save unreadable, starting fresh");
                None
            }
        };

        let Some(record) = record else {
            debug!(backend = self.store.backend(), "No saved pet");
            return Ok(None);
        };

        if !record.alive {
            info!(pet = %record.id, name = %record.profile.name, "Saved pet has passed away, discarding save");
            self.store.delete()?;
            return Ok(None);
        }

        info!(pet = %record.id, name = %record.profile.name, age = record.age, "Resuming saved pet");
        let pet = Pet::attach(record, self.bind(hooks), &self.config.simulation);
        self.play(pet.clone())?;
        Ok(Some(pet))
    }

    /// Adopt a new pet and start it ticking. Returns the pet and its
    /// characteristic notice.
    ///
    /// A pet already in play is stopped first, without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler cannot start.
    pub fn adopt(&mut self, adoption: &Adoption, hooks: Hooks) -> Result<(Pet, Notice)> {
        if let Some(previous) = self.pet.take() {
            warn!(pet = %previous.id(), "Replacing the pet in play");
        }
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.shutdown();
        }

        let pet = Pet::adopt(
            adoption.profile.clone(),
            adoption.species,
            self.bind(hooks),
            &self.config.simulation,
        );
        let notice = pet.characteristic();
        self.play(pet.clone())?;
        Ok((pet, notice))
    }

    /// Save the pet in play if it is alive. Returns `true` if it was saved.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the write fails.
    pub fn save(&self) -> Result<bool> {
        let Some(pet) = &self.pet else {
            return Ok(false);
        };
        let record = pet.to_record();
        if !record.alive {
            return Ok(false);
        }
        self.store.save(&record)?;
        Ok(true)
    }

    /// Stop ticking and save the pet if it is still alive.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the final save fails; the scheduler is
    /// stopped either way.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.shutdown();
            scheduler.join().await;
        }
        let saved = self.save()?;
        if let Some(pet) = self.pet.take() {
            info!(pet = %pet.id(), saved, "Session closed");
        }
        Ok(())
    }

    fn play(&mut self, pet: Pet) -> Result<()> {
        let mut scheduler = TickScheduler::from_config(&self.config.simulation);
        scheduler.start(pet.clone())?;
        self.scheduler = Some(scheduler);
        self.pet = Some(pet);
        Ok(())
    }

    /// Delete the save before the caller's death hook runs.
    fn bind(&self, hooks: Hooks) -> Hooks {
        let store = Arc::clone(&self.store);
        let death = Arc::clone(hooks.death());
        hooks.with_death(move |snapshot| {
            match store.delete() {
                Ok(existed) => debug!(pet = %snapshot.id, existed, "Save removed after death"),
                Err(e) => warn!(pet = %snapshot.id, error = %e, "Failed to remove save after death"),
            }
            death(snapshot);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tamago_core::meters::Meter;
    use tamago_core::persistence::MemoryStore;
    use tamago_core::{PetRecord, Profile, SpeciesKind};

    fn config() -> TamagoConfig {
        let mut config = TamagoConfig::default();
        config.simulation.rng_seed = Some(7);
        config
    }

    fn session(store: &Arc<MemoryStore>) -> Session {
        Session::open(store.clone(), config())
    }

    #[tokio::test(start_paused = true)]
    async fn empty_store_resumes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut s = session(&store);
        assert!(s.resume(Hooks::inert()).expect("resume").is_none());
        assert!(s.pet().is_none());
        assert!(s.scheduler_state().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn corrupt_save_is_treated_as_none() {
        let store = Arc::new(MemoryStore::with_bytes(b"{ broken".to_vec()));
        let mut s = session(&store);
        assert!(s.resume(Hooks::inert()).expect("resume").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dead_save_is_deleted() {
        let mut record = PetRecord::new(Profile::new("Ghost", "", "", vec![]), SpeciesKind::Cat);
        record.alive = false;
        let store = Arc::new(MemoryStore::new());
        store.save(&record).expect("seed save");

        let mut s = session(&store);
        assert!(s.resume(Hooks::inert()).expect("resume").is_none());
        assert!(!store.has_save());
    }

    #[tokio::test(start_paused = true)]
    async fn adopt_starts_ticking_and_shutdown_saves() {
        let store = Arc::new(MemoryStore::new());
        let mut s = session(&store);
        let (pet, notice) = s
            .adopt(&Adoption::new("Rex", SpeciesKind::Dog), Hooks::inert())
            .expect("adopt");
        assert_eq!(notice.message, "Rex is a loyal and playful dog!");
        assert_eq!(s.scheduler_state(), Some(SchedulerState::Running));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(pet.snapshot().age, 2);

        s.shutdown().await.expect("shutdown");
        let saved = store.load().expect("load").expect("saved");
        assert_eq!(saved.age, 2);
        assert_eq!(saved.id, pet.id());
        assert!(s.pet().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn resume_continues_where_it_left_off() {
        let store = Arc::new(MemoryStore::new());
        let mut first = session(&store);
        let (pet, _) = first
            .adopt(&Adoption::new("Tom", SpeciesKind::Cat), Hooks::inert())
            .expect("adopt");
        pet.feed_named("meal").expect("meal");
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        first.shutdown().await.expect("shutdown");

        let mut second = session(&store);
        let resumed = second.resume(Hooks::inert()).expect("resume").expect("live pet");
        assert_eq!(resumed.id(), pet.id());
        assert_eq!(resumed.snapshot().age, 1);
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(resumed.snapshot().age, 2);
        second.shutdown().await.expect("shutdown");
    }

    #[tokio::test(start_paused = true)]
    async fn death_deletes_the_save_before_the_hook_runs() {
        let store = Arc::new(MemoryStore::new());
        let mut record = PetRecord::new(Profile::new("Rex", "", "", vec![]), SpeciesKind::Dog);
        record.meters.set(Meter::Hunger, 1);
        store.save(&record).expect("seed save");

        let seen = Arc::new(Mutex::new(None));
        let (seen_in_hook, store_in_hook) = (seen.clone(), store.clone());
        let hooks = Hooks::inert().with_death(move |snapshot| {
            *seen_in_hook.lock() = Some((snapshot.name.clone(), store_in_hook.has_save()));
        });

        let mut s = session(&store);
        s.resume(hooks).expect("resume").expect("live pet");
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(*seen.lock(), Some(("Rex".to_string(), false)));
        assert_eq!(s.scheduler_state(), Some(SchedulerState::Stopped));

        s.shutdown().await.expect("shutdown");
        assert!(!store.has_save(), "dead pets are not saved");
    }

    #[test]
    fn adopt_needs_a_runtime() {
        let store = Arc::new(MemoryStore::new());
        let mut s = session(&store);
        assert!(s.adopt(&Adoption::new("Rex", SpeciesKind::Dog), Hooks::inert()).is_err());
        assert!(s.pet().is_none());
    }
}
