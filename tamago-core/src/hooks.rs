//! Notification hooks: how the engine tells its front end something changed.
//!
//! Hooks are plain closures, supplied when a pet is attached and never
//! persisted. They run synchronously on whichever side triggered the
//! change (the scheduler task or the caller of a command), so they should
//! return quickly. A panicking hook is logged and otherwise ignored; the
//! state change it was reporting has already been committed.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::snapshot::StatusSnapshot;
use crate::types::Notice;

/// Called after every committed tick or command.
pub type StatusHook = Arc<dyn Fn(&StatusSnapshot, &[Notice]) + Send + Sync>;

/// Called exactly once, when the pet dies.
pub type DeathHook = Arc<dyn Fn(&StatusSnapshot) + Send + Sync>;

/// The pair of hooks bound to a live pet.
#[derive(Clone)]
pub struct Hooks {
    status: StatusHook,
    death: DeathHook,
}

impl Hooks {
    /// Bind both hooks.
    pub fn new<S, D>(status: S, death: D) -> Self
    where
        S: Fn(&StatusSnapshot, &[Notice]) + Send + Sync + 'static,
        D: Fn(&StatusSnapshot) + Send + Sync + 'static,
    {
        Self {
            status: Arc::new(status),
            death: Arc::new(death),
        }
    }

    /// Hooks that do nothing.
    #[must_use]
    pub fn inert() -> Self {
        Self::new(|_, _| {}, |_| {})
    }

    /// Replace the death hook, keeping the status hook.
    #[must_use]
    pub fn with_death<D>(mut self, death: D) -> Self
    where
        D: Fn(&StatusSnapshot) + Send + Sync + 'static,
    {
        self.death = Arc::new(death);
        self
    }

    /// The status hook.
    #[must_use]
    pub fn status(&self) -> &StatusHook {
        &self.status
    }

    /// The death hook.
    #[must_use]
    pub fn death(&self) -> &DeathHook {
        &self.death
    }

    pub(crate) fn notify_status(&self, snapshot: &StatusSnapshot, notices: &[Notice]) {
        let hook = &self.status;
        if panic::catch_unwind(AssertUnwindSafe(|| hook(snapshot, notices))).is_err() {
            warn!(pet = %snapshot.id, "Status hook panicked; state change already committed");
        }
    }

    pub(crate) fn notify_death(&self, snapshot: &StatusSnapshot) {
        let hook = &self.death;
        if panic::catch_unwind(AssertUnwindSafe(|| hook(snapshot))).is_err() {
            warn!(pet = %snapshot.id, "Death hook panicked");
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::inert()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}
