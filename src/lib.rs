//! Monster Battle Engine
//!
//! Authoritative resolution of turn-based battles between two teams of collectible
//! creatures: turn state machine, abilities, passives, status effects, damage and
//! targeting, and a per-session lock around every externally invoked operation.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod monster;
pub mod persistence;
pub mod session;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    AbilityData, AbilityKind, ActivationScope, Affinity, BaseStats, HitRange, ModifierKind,
    MonsterTemplate, PassiveTarget, PassiveTrigger, Position, StatModifierTemplate, StatType,
    StatusEffectTemplate, StatusKind, TargetScope, ValueKind,
};

// --- From this crate's modules (`src/`) ---
pub use battle::combatant::BattleCombatant;
pub use battle::effects::{ActiveEffect, StatusEffect};
pub use battle::state::{
    ActionFailureReason, BattleEvent, BattlePhase, BattleRng, BattleSession, CombatantRef, EventBus, Side,
};
pub use catalog::{Catalog, StaticCatalog};
pub use config::{AffinityRule, EngineConfig};
pub use monster::OwnedMonster;
pub use persistence::{FinalMonsterState, InMemoryRosterStore, RosterStore};
pub use session::{SessionId, SessionStore};

pub use errors::{ActionError, BattleError, BattleResult, CatalogError, ConfigError, PersistenceError};
