use thiserror::Error;
use uuid::Uuid;

/// Main error type for the battle engine.
///
/// Every variant carries a stable message so the API layer can map it to a
/// client-visible response.
#[derive(Debug, Error)]
pub enum BattleError {
    #[error("battle session not found: {0}")]
    SessionNotFound(Uuid),
    /// Another operation on the same session is in flight. Callers retry.
    #[error("battle session is busy: {0}")]
    SessionBusy(Uuid),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("failed to persist final battle state: {0}")]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors related to an invalid request against an existing session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("combatant has fainted and cannot act: {0}")]
    FaintedActor(String),
    #[error("ability {ability_id} is not known by {combatant}")]
    AbilityNotOwned { combatant: String, ability_id: String },
    #[error("ability {0} is passive and cannot be used directly")]
    PassiveAbility(String),
    #[error("battle has already ended")]
    BattleEnded,
    #[error("it is not the player's turn")]
    NotPlayersTurn,
    #[error("invalid swap target: {0}")]
    InvalidSwapTarget(usize),
}

/// Errors related to catalog lookups and loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("monster template not found: {0}")]
    MonsterNotFound(String),
    #[error("ability not found: {0}")]
    AbilityNotFound(String),
    #[error("ability {ability_id} has an invalid hit range {min}..={max}")]
    InvalidHitRange { ability_id: String, min: u8, max: u8 },
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog data: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Failure reported by the roster store when writing final battle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PersistenceError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Type alias for Results using BattleError
pub type BattleResult<T> = Result<T, BattleError>;

/// Type alias for Results using CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
