//! Status effect engine: application, refresh, per-turn ticks and expiry.

use crate::battle::calculators::status_magnitude;
use crate::battle::state::{BattleEvent, BattleSession, CombatantRef, Side};
use schema::{ModifierKind, StatModifierTemplate, StatType, StatusEffectTemplate, StatusKind, ValueKind};
use serde::{Deserialize, Serialize};

/// A timed stat modifier on a combatant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub stat: StatType,
    pub kind: ModifierKind,
    pub value: f64,
    pub remaining: u32,
    /// Ability that created the effect. HP-threshold passives use it to avoid stacking.
    pub source: String,
    /// Set when applied during the AI's half-turn; the tick closing that cycle skips it.
    #[serde(default)]
    pub fresh: bool,
}

impl ActiveEffect {
    pub fn from_template(template: &StatModifierTemplate, source: &str) -> Self {
        Self {
            stat: template.stat,
            kind: template.kind,
            value: template.value,
            remaining: template.duration,
            source: source.to_string(),
            fresh: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusEffect {
    pub name: String,
    pub remaining: u32,
    pub kind: StatusKind,
    pub value: f64,
    pub value_kind: ValueKind,
    pub secondary_value: Option<f64>,
    #[serde(default)]
    pub fresh: bool,
}

impl StatusEffect {
    pub fn from_template(template: &StatusEffectTemplate) -> Self {
        Self {
            name: template.name.clone(),
            remaining: template.duration,
            kind: template.kind,
            value: template.value,
            value_kind: template.value_kind,
            secondary_value: template.secondary_value,
            fresh: false,
        }
    }
}

/// Apply a status effect, refreshing the duration of a same-named one if present.
pub fn apply_status(session: &mut BattleSession, target: CombatantRef, template: &StatusEffectTemplate) {
    let fresh = session.turn == Side::Ai;
    let Some(combatant) = session.combatant_mut(target) else {
        return;
    };
    if combatant.fainted {
        return;
    }

    match combatant
        .status_effects
        .iter_mut()
        .find(|effect| effect.name == template.name)
    {
        Some(existing) => {
            existing.remaining = template.duration;
            existing.fresh = fresh;
        }
        None => combatant.status_effects.push(StatusEffect {
            fresh,
            ..StatusEffect::from_template(template)
        }),
    }

    session.emit(BattleEvent::StatusApplied {
        target,
        status: template.name.clone(),
        duration: template.duration,
    });
}

pub fn apply_modifiers(
    session: &mut BattleSession,
    target: CombatantRef,
    templates: &[StatModifierTemplate],
    source: &str,
) {
    let fresh = session.turn == Side::Ai;
    let Some(combatant) = session.combatant_mut(target) else {
        return;
    };
    if combatant.fainted {
        return;
    }
    for template in templates {
        combatant
            .active_effects
            .push(ActiveEffect {
                fresh,
                ..ActiveEffect::from_template(template, source)
            });
    }
}

/// What a start-of-turn status tick left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Alive,
    /// The owner's HP reached zero; the caller runs the faint check.
    Dropped,
}

/// Apply one damage-over-time effect by name.
pub fn tick_damage(session: &mut BattleSession, target: CombatantRef, status_name: &str) -> TickResult {
    let Some(combatant) = session.combatant_mut(target) else {
        return TickResult::Alive;
    };
    let Some(effect) = combatant
        .status_effects
        .iter()
        .find(|effect| effect.name == status_name)
    else {
        return TickResult::Alive;
    };

    let amount = status_magnitude(effect, combatant.max_hp);
    let dealt = combatant.take_damage(amount);
    let remaining_hp = combatant.hp;

    session.emit(BattleEvent::Damage {
        target,
        source: status_name.to_string(),
        amount: dealt,
        remaining_hp,
    });

    if remaining_hp == 0 {
        TickResult::Dropped
    } else {
        TickResult::Alive
    }
}

/// Apply every healing-over-time effect on the target.
pub fn tick_healing(session: &mut BattleSession, target: CombatantRef) {
    let Some(combatant) = session.combatant(target) else {
        return;
    };
    let heals: Vec<(String, u32)> = combatant
        .status_effects
        .iter()
        .filter(|effect| effect.kind == StatusKind::HealingOverTime)
        .map(|effect| (effect.name.clone(), status_magnitude(effect, combatant.max_hp)))
        .collect();

    for (name, amount) in heals {
        let Some(combatant) = session.combatant_mut(target) else {
            return;
        };
        let healed = combatant.heal(amount);
        let new_hp = combatant.hp;
        session.emit(BattleEvent::Healed {
            target,
            source: name,
            amount: healed,
            new_hp,
        });
    }
}

/// Decrement every effect on every non-fainted combatant of both teams, dropping
/// the ones that reach zero. Runs once per full cycle. Effects applied during the
/// AI's half of this cycle are only unmarked, so a duration always covers that
/// many of the recipient's later turns.
pub fn tick_durations(session: &mut BattleSession) {
    for side in [Side::Player, Side::Ai] {
        for target in session.refs(side) {
            let Some(combatant) = session.combatant_mut(target) else {
                continue;
            };
            if combatant.fainted {
                continue;
            }

            let mut expired_modifiers = Vec::new();
            combatant.active_effects.retain_mut(|effect| {
                if effect.fresh {
                    effect.fresh = false;
                    return true;
                }
                effect.remaining = effect.remaining.saturating_sub(1);
                if effect.remaining == 0 {
                    expired_modifiers.push(effect.stat);
                    false
                } else {
                    true
                }
            });

            let mut expired_statuses = Vec::new();
            combatant.status_effects.retain_mut(|effect| {
                if effect.fresh {
                    effect.fresh = false;
                    return true;
                }
                effect.remaining = effect.remaining.saturating_sub(1);
                if effect.remaining == 0 {
                    expired_statuses.push(effect.name.clone());
                    false
                } else {
                    true
                }
            });

            for stat in expired_modifiers {
                session.emit(BattleEvent::ModifierExpired { target, stat });
            }
            for status in expired_statuses {
                session.emit(BattleEvent::StatusExpired { target, status });
            }
        }
    }
}
