use crate::battle::state::{BattleSession, CombatantRef};
use schema::{AbilityData, TargetScope};

/// Concrete combatants an ability affects. Empty when nothing valid remains.
pub fn resolve_targets(
    session: &BattleSession,
    actor: CombatantRef,
    ability: &AbilityData,
    explicit_target: Option<&str>,
) -> Vec<CombatantRef> {
    let alive = |target: &CombatantRef| {
        session
            .combatant(*target)
            .is_some_and(|combatant| !combatant.fainted)
    };
    let opponent = actor.side.opponent();

    match ability.target {
        TargetScope::SingleEnemy => session.active_ref(opponent).into_iter().filter(alive).collect(),
        TargetScope::AllEnemies => session.refs(opponent).into_iter().filter(alive).collect(),
        TargetScope::Ally => match explicit_target {
            Some(target_id) => session
                .refs(actor.side)
                .into_iter()
                .filter(|target| {
                    session
                        .combatant(*target)
                        .is_some_and(|combatant| combatant.id == target_id)
                })
                .filter(alive)
                .take(1)
                .collect(),
            None => Some(actor).into_iter().filter(alive).collect(),
        },
        TargetScope::SelfOnly => Some(actor).into_iter().filter(alive).collect(),
    }
}
