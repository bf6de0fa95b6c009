//! Passive ability dispatch.
//!
//! Passives are looked up by [`TriggerPhase`] and filtered by the owner's current
//! [`Position`] against the passive's [`ActivationScope`]. Each phase of the turn
//! calls exactly one of the entry points below.

use crate::battle::effects;
use crate::battle::state::{BattleEvent, BattleSession, CombatantRef, Side};
use schema::{
    AbilityData, AbilityKind, ActivationScope, PassiveTarget, PassiveTrigger, StatusEffectTemplate,
    StatusKind, TriggerPhase,
};

fn scope_of(ability: &AbilityData) -> ActivationScope {
    match &ability.kind {
        AbilityKind::Passive { scope, .. } => *scope,
        AbilityKind::Active => ActivationScope::Any,
    }
}

/// Passives of one owner for a phase, filtered by the owner's position.
fn eligible(session: &BattleSession, owner: CombatantRef, phase: TriggerPhase) -> Vec<AbilityData> {
    let Some(combatant) = session.combatant(owner) else {
        return Vec::new();
    };
    if combatant.fainted {
        return Vec::new();
    }
    let position = session.position(owner);
    combatant
        .passives(phase)
        .into_iter()
        .filter(|ability| scope_of(ability).admits(position))
        .cloned()
        .collect()
}

fn recipients(session: &BattleSession, owner: CombatantRef, target: PassiveTarget) -> Vec<CombatantRef> {
    let candidates = match target {
        PassiveTarget::Owner => vec![owner],
        PassiveTarget::ActiveAlly => session.active_ref(owner.side).into_iter().collect(),
        PassiveTarget::Team => session.refs(owner.side),
        PassiveTarget::ActiveOpponent => session.active_ref(owner.side.opponent()).into_iter().collect(),
    };
    candidates
        .into_iter()
        .filter(|r| session.combatant(*r).is_some_and(|c| !c.fainted))
        .collect()
}

/// Fire a passive: stat modifiers, status template and healing land on its recipients.
pub fn execute_passive(session: &mut BattleSession, owner: CombatantRef, ability: &AbilityData) {
    let AbilityKind::Passive { target, heal_percent, .. } = &ability.kind else {
        return;
    };

    session.emit(BattleEvent::PassiveActivated {
        owner,
        ability: ability.name.clone(),
    });

    for recipient in recipients(session, owner, *target) {
        if !ability.stat_modifiers.is_empty() {
            effects::apply_modifiers(session, recipient, &ability.stat_modifiers, &ability.id);
        }
        if let Some(status) = &ability.status_effect {
            effects::apply_status(session, recipient, status);
        }
        if let Some(percent) = heal_percent {
            let Some(combatant) = session.combatant_mut(recipient) else {
                continue;
            };
            let amount = (combatant.max_hp as f64 * percent / 100.0).floor() as u32;
            let healed = combatant.heal(amount);
            let new_hp = combatant.hp;
            session.emit(BattleEvent::Healed {
                target: recipient,
                source: ability.name.clone(),
                amount: healed,
                new_hp,
            });
            evaluate_hp_thresholds(session, recipient);
        }
    }
}

fn execute_in_priority_order(session: &mut BattleSession, mut queue: Vec<(CombatantRef, AbilityData)>) {
    // Stable sort: equal priorities keep team order, player first.
    queue.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority));
    for (owner, ability) in queue {
        execute_passive(session, owner, &ability);
    }
}

/// Battle-start passives of every member of both teams, benched included.
pub fn run_battle_start(session: &mut BattleSession) {
    let mut queue = Vec::new();
    for side in [Side::Player, Side::Ai] {
        for owner in session.refs(side) {
            let Some(combatant) = session.combatant(owner) else {
                continue;
            };
            for ability in combatant.passives(TriggerPhase::BattleStart) {
                queue.push((owner, ability.clone()));
            }
        }
    }
    execute_in_priority_order(session, queue);
}

pub fn run_start_of_turn(session: &mut BattleSession, actor: CombatantRef) {
    let queue = eligible(session, actor, TriggerPhase::StartOfTurn)
        .into_iter()
        .map(|ability| (actor, ability))
        .collect();
    execute_in_priority_order(session, queue);
}

/// End-of-turn passives of every member of the side that just acted. A bench-only
/// passive fires for a benched owner.
pub fn run_end_of_turn(session: &mut BattleSession, side: Side) {
    let mut queue = Vec::new();
    for owner in session.refs(side) {
        for ability in eligible(session, owner, TriggerPhase::EndOfTurn) {
            queue.push((owner, ability));
        }
    }
    execute_in_priority_order(session, queue);
}

pub fn run_on_damage_taken(session: &mut BattleSession, target: CombatantRef) {
    let queue = eligible(session, target, TriggerPhase::OnDamageTaken)
        .into_iter()
        .map(|ability| (target, ability))
        .collect();
    execute_in_priority_order(session, queue);
}

/// Roll the target's evasion passives and evasion statuses against an incoming
/// ability. Returns true if the ability is evaded.
pub fn check_evasion(session: &mut BattleSession, target: CombatantRef, incoming: &AbilityData) -> bool {
    let passive_chances: Vec<(String, u8)> = eligible(session, target, TriggerPhase::OnBeingHit)
        .into_iter()
        .filter_map(|ability| match ability.passive_trigger() {
            Some(PassiveTrigger::OnBeingHit { chance, affinity })
                if affinity.map_or(true, |a| a == incoming.affinity) =>
            {
                Some((ability.name.clone(), *chance))
            }
            _ => None,
        })
        .collect();

    for (name, chance) in passive_chances {
        if session.rng.roll_chance(chance, &format!("evasion passive {}", name)) {
            session.emit(BattleEvent::PassiveActivated { owner: target, ability: name });
            return true;
        }
    }

    let status_chances: Vec<u8> = session
        .combatant(target)
        .map(|combatant| {
            combatant
                .status_effects
                .iter()
                .filter(|effect| effect.kind == StatusKind::Evasion)
                .map(|effect| effect.value.clamp(0.0, 100.0) as u8)
                .collect()
        })
        .unwrap_or_default();

    status_chances
        .into_iter()
        .any(|chance| session.rng.roll_chance(chance, "evasion status"))
}

/// Status templates the attacker's on-ability-use passives attach to this hit.
pub fn queue_on_ability_use(
    session: &mut BattleSession,
    attacker: CombatantRef,
    used: &AbilityData,
) -> Vec<StatusEffectTemplate> {
    let mut queued = Vec::new();
    for ability in eligible(session, attacker, TriggerPhase::OnAbilityUse) {
        let matches_affinity = match ability.passive_trigger() {
            Some(PassiveTrigger::OnAbilityUse { affinity }) => affinity.map_or(true, |a| a == used.affinity),
            _ => false,
        };
        if !matches_affinity {
            continue;
        }
        if let Some(status) = &ability.status_effect {
            session.emit(BattleEvent::PassiveActivated {
                owner: attacker,
                ability: ability.name.clone(),
            });
            queued.push(status.clone());
        }
    }
    queued
}

/// Switch HP-threshold modifiers on at or below their threshold and off above it.
/// Activation is tracked through the modifiers' source ability id.
pub fn evaluate_hp_thresholds(session: &mut BattleSession, target: CombatantRef) {
    for ability in eligible(session, target, TriggerPhase::OnHpThreshold) {
        let Some(PassiveTrigger::OnHpThreshold { percent }) = ability.passive_trigger() else {
            continue;
        };
        if ability.stat_modifiers.is_empty() {
            continue;
        }
        let Some(combatant) = session.combatant_mut(target) else {
            return;
        };
        let below = combatant.hp_percent() <= *percent as f64;
        let applied = combatant.active_effects.iter().any(|effect| effect.source == ability.id);

        if below && !applied {
            effects::apply_modifiers(session, target, &ability.stat_modifiers, &ability.id);
            session.emit(BattleEvent::PassiveActivated {
                owner: target,
                ability: ability.name.clone(),
            });
        } else if !below && applied {
            combatant.active_effects.retain(|effect| effect.source != ability.id);
            let line = format!("{}'s {} subsided.", combatant.name, ability.name);
            session.narrate(line);
        }
    }
}
