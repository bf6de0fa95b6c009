use crate::battle::combatant::BattleCombatant;
use crate::battle::effects::StatusEffect;
use crate::config::AffinityRule;
use schema::{AbilityData, Affinity, ValueKind};

/// Multiplier for an ability of `affinity` landing on `target`.
pub fn affinity_multiplier(rule: AffinityRule, affinity: Affinity, target: &BattleCombatant) -> f64 {
    match rule {
        AffinityRule::MonsterLists => {
            if target.is_weak_to(affinity) {
                1.5
            } else if target.resists(affinity) {
                0.5
            } else {
                1.0
            }
        }
        AffinityRule::TypeChart => Affinity::chart_multiplier(affinity, target.template.affinity),
    }
}

/// Damage of a single hit: `floor(scaling stat × power multiplier)`, then the
/// affinity multiplier, floored again.
pub fn calculate_damage(
    attacker: &BattleCombatant,
    ability: &AbilityData,
    target: &BattleCombatant,
    rule: AffinityRule,
) -> u32 {
    let stat = attacker.modified_stat(ability.scaling_stat) as f64;
    let base = (stat * ability.power_multiplier).floor();
    let multiplier = affinity_multiplier(rule, ability.affinity, target);
    (base * multiplier).floor().max(0.0) as u32
}

/// Healing of a support ability: `floor(scaling stat × healing power)`.
pub fn calculate_heal(caster: &BattleCombatant, ability: &AbilityData) -> u32 {
    let stat = caster.modified_stat(ability.scaling_stat) as f64;
    (stat * ability.healing_power).floor().max(0.0) as u32
}

/// Per-tick magnitude of a damage- or healing-over-time effect.
pub fn status_magnitude(effect: &StatusEffect, max_hp: u32) -> u32 {
    let amount = match effect.value_kind {
        ValueKind::Flat => effect.value,
        ValueKind::PercentOfMaxHp => max_hp as f64 * effect.value / 100.0,
    };
    amount.floor().max(0.0) as u32
}

/// Confusion self-damage: `floor(modified power × fraction)`.
pub fn confusion_damage(combatant: &BattleCombatant, fraction: f64) -> u32 {
    let power = combatant.modified_stat(schema::StatType::Power) as f64;
    (power * fraction).floor().max(0.0) as u32
}
