//! Session registry and the per-session lock.
//!
//! Each session sits behind its own `tokio::sync::Mutex`. Operations take it with
//! `try_lock_owned`, so a second concurrent call on the same session fails with
//! [`BattleError::SessionBusy`] instead of queuing. Work happens on a clone of the
//! locked state which is written back only if the whole operation succeeds.

use crate::battle::combatant::BattleCombatant;
use crate::battle::state::{BattleRng, BattleSession, EngineContext, Side};
use crate::battle::turn_orchestrator::{initialize_battle, resolve_ai_turn, resolve_player_action, resolve_swap};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::errors::{BattleError, BattleResult};
use crate::monster::OwnedMonster;
use crate::persistence::RosterStore;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub type SessionId = Uuid;

pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<BattleSession>>>,
    catalog: Arc<dyn Catalog>,
    roster_store: Arc<dyn RosterStore>,
    config: EngineConfig,
}

impl SessionStore {
    pub fn new(catalog: Arc<dyn Catalog>, roster_store: Arc<dyn RosterStore>, config: EngineConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            catalog,
            roster_store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a battle. `lead_index` picks the player's opening combatant.
    pub fn create_session(
        &self,
        player_roster: &[OwnedMonster],
        ai_roster: &[OwnedMonster],
        lead_index: usize,
    ) -> BattleResult<(SessionId, BattleSession)> {
        let rng = match self.config.rng_seed {
            Some(seed) => BattleRng::from_seed(seed),
            None => BattleRng::new_random(),
        };
        self.create_session_with_rng(player_roster, ai_roster, lead_index, rng)
    }

    pub fn create_session_with_rng(
        &self,
        player_roster: &[OwnedMonster],
        ai_roster: &[OwnedMonster],
        lead_index: usize,
        rng: BattleRng,
    ) -> BattleResult<(SessionId, BattleSession)> {
        let mut player = self.convert_roster(player_roster, Side::Player)?;
        let ai = self.convert_roster(ai_roster, Side::Ai)?;

        if lead_index < player.len() {
            let lead = player.remove(lead_index);
            player.insert(0, lead);
        } else if !player.is_empty() {
            tracing::warn!(lead_index, roster = player.len(), "lead index out of range, using first");
        }

        let id = Uuid::new_v4();
        let mut session = BattleSession::new(id, player, ai, rng);
        initialize_battle(&mut session);

        self.sessions.insert(id, Arc::new(Mutex::new(session.clone())));
        tracing::info!(session = %id, first = ?session.turn, "battle session created");
        Ok((id, session))
    }

    pub fn perform_action(
        &self,
        id: SessionId,
        ability_id: &str,
        target_id: Option<&str>,
    ) -> BattleResult<BattleSession> {
        self.with_session(id, |session, ctx| resolve_player_action(session, ctx, ability_id, target_id))
    }

    /// Swap the player's active combatant; the AI's reply resolves in the same call.
    pub fn perform_swap(&self, id: SessionId, new_active_index: usize) -> BattleResult<BattleSession> {
        self.with_session(id, |session, ctx| resolve_swap(session, ctx, new_active_index))
    }

    pub fn process_ai_turn(&self, id: SessionId) -> BattleResult<BattleSession> {
        self.with_session(id, resolve_ai_turn)
    }

    /// Snapshot of the committed state.
    pub fn session(&self, id: SessionId) -> BattleResult<BattleSession> {
        self.with_session(id, |_, _| Ok(()))
    }

    pub fn remove_session(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Drop every ended session that is not currently locked. Returns how many went.
    pub fn evict_finished(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.ended,
            Err(_) => true,
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, "evicted finished battle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn convert_roster(&self, roster: &[OwnedMonster], side: Side) -> BattleResult<Vec<BattleCombatant>> {
        roster
            .iter()
            .map(|owned| BattleCombatant::from_owned(owned, side, self.catalog.as_ref()).map_err(BattleError::from))
            .collect()
    }

    fn with_session<F>(&self, id: SessionId, op: F) -> BattleResult<BattleSession>
    where
        F: FnOnce(&mut BattleSession, &EngineContext) -> BattleResult<()>,
    {
        let handle = self
            .sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(BattleError::SessionNotFound(id))?;
        let mut guard = handle
            .try_lock_owned()
            .map_err(|_| BattleError::SessionBusy(id))?;

        let ctx = EngineContext {
            affinity_rule: self.config.affinity_rule,
            roster_store: self.roster_store.as_ref(),
        };
        let mut working = guard.clone();
        match op(&mut working, &ctx) {
            Ok(()) => {
                *guard = working.clone();
                Ok(working)
            }
            Err(err) => {
                tracing::warn!(session = %id, error = %err, "operation failed, state rolled back");
                Err(err)
            }
        }
    }
}
