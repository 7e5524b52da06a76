//! The background tick loop.
//!
//! One [`TickScheduler`] drives one [`Pet`] for the rest of its life:
//!
//! ```text
//!   Idle ──start()──▶ Running ──pet dies──▶ Stopped
//!                        │                     ▲
//!                        └──── shutdown() ─────┘
//! ```
//!
//! While running it waits a fixed interval, ticks the pet (which notifies
//! the status hook, and the death hook on the fatal tick), and stops for
//! good once the pet is dead. Stopped is terminal: a new pet needs a new
//! scheduler. The interval is fixed; a slow hook delays the next tick
//! rather than causing a burst of catch-up ticks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{Result, TamagoError};
use crate::pet::Pet;

/// Lifecycle of a [`TickScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not yet started.
    Idle,
    /// Ticking.
    Running,
    /// Finished. Never restarts.
    Stopped,
}

/// Drives a pet's ticks on a tokio runtime.
#[derive(Debug)]
pub struct TickScheduler {
    interval: Duration,
    state: Arc<Mutex<SchedulerState>>,
    task: Option<JoinHandle<()>>,
}

impl TickScheduler {
    /// A scheduler ticking every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Arc::new(Mutex::new(SchedulerState::Idle)),
            task: None,
        }
    }

    /// A scheduler using `config.tick_interval_ms`.
    #[must_use]
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.tick_interval())
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// Tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start ticking `pet` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`TamagoError::SchedulerState`] if this scheduler is not
    /// idle, if the pet is already dead or already has a scheduler, or if
    /// called outside a tokio runtime.
    pub fn start(&mut self, pet: Pet) -> Result<()> {
        let mut state = self.state.lock();
        if *state != SchedulerState::Idle {
            return Err(TamagoError::SchedulerState(format!(
                "cannot start a scheduler in state {:?}",
                *state
            )));
        }
        if !pet.is_alive() {
            return Err(TamagoError::SchedulerState(format!(
                "{} is not alive",
                pet.name()
            )));
        }
        let handle = Handle::try_current()
            .map_err(|e| TamagoError::SchedulerState(format!("no tokio runtime: {e}")))?;
        if !pet.claim_scheduler() {
            return Err(TamagoError::SchedulerState(format!(
                "{} is already being ticked",
                pet.name()
            )));
        }

        info!(
            pet = %pet.id(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "Tick scheduler started"
        );
        *state = SchedulerState::Running;
        drop(state);

        self.task = Some(handle.spawn(run(pet, self.interval, Arc::clone(&self.state))));
        Ok(())
    }

    /// Stop ticking without waiting for the pet to die (process shutdown).
    pub fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let mut state = self.state.lock();
        if *state != SchedulerState::Stopped {
            debug!(previous = ?*state, "Tick scheduler shut down");
            *state = SchedulerState::Stopped;
        }
    }

    /// Wait for the loop to finish (the pet died, or it was shut down).
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            // An aborted task reports a cancellation error; either way it is done.
            let _ = task.await;
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(pet: Pet, period: Duration, state: Arc<Mutex<SchedulerState>>) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let report = pet.tick();
        if !report.alive() {
            *state.lock() = SchedulerState::Stopped;
            info!(pet = %report.snapshot.id, age = report.snapshot.age, "Tick scheduler stopped: pet died");
            break;
        }
    }
}
