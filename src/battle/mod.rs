pub mod ai;
pub mod calculators;
pub mod combatant;
pub mod effects;
pub mod outcome;
pub mod passives;
pub mod state;
pub mod targeting;
pub mod turn_orchestrator;

#[cfg(test)]
pub(crate) mod tests;
