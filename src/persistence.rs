//! Write-back interface for the caller's permanent creature records.

use crate::errors::PersistenceError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Final battle-scoped values of one player creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalMonsterState {
    pub monster_id: String,
    pub hp: u32,
    pub mp: u32,
    pub fainted: bool,
}

/// Invoked exactly once per battle, when it ends.
pub trait RosterStore: Send + Sync {
    fn save_final_battle_state(&self, roster: &[FinalMonsterState]) -> Result<(), PersistenceError>;
}

/// Keeps every saved roster in memory. Used by the demo binary and tests.
#[derive(Debug, Default)]
pub struct InMemoryRosterStore {
    saved: Mutex<Vec<Vec<FinalMonsterState>>>,
    fail_writes: AtomicBool,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes fail until `set_failing(false)` is called.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().map(|saved| saved.len()).unwrap_or(0)
    }

    pub fn last_saved(&self) -> Option<Vec<FinalMonsterState>> {
        self.saved.lock().ok().and_then(|saved| saved.last().cloned())
    }
}

impl RosterStore for InMemoryRosterStore {
    fn save_final_battle_state(&self, roster: &[FinalMonsterState]) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError("roster store unavailable".to_string()));
        }
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| PersistenceError("roster store lock poisoned".to_string()))?;
        saved.push(roster.to_vec());
        Ok(())
    }
}
