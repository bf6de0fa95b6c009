//! Ability selection for the AI side.

use crate::battle::calculators::{affinity_multiplier, calculate_heal};
use crate::battle::state::{BattleSession, Side};
use crate::config::AffinityRule;
use schema::{AbilityData, StatusKind, TargetScope};

/// A trait for any system that can pick the next ability for a side.
pub trait Behavior {
    /// Returns the id of the ability to use, or None if the side has no active ability.
    fn choose_ability(&self, session: &BattleSession, side: Side) -> Option<String>;
}

pub struct ScoringAI {
    rule: AffinityRule,
}

impl ScoringAI {
    pub fn new(rule: AffinityRule) -> Self {
        Self { rule }
    }

    fn score(&self, ability: &AbilityData, session: &BattleSession, side: Side) -> f64 {
        let Some(actor) = session.active(side) else {
            return 0.0;
        };

        match ability.target {
            TargetScope::SingleEnemy | TargetScope::AllEnemies => {
                let Some(defender) = session.active(side.opponent()).filter(|d| !d.fainted) else {
                    // Only area abilities can still reach the bench.
                    return if ability.target == TargetScope::AllEnemies { 1.0 } else { 0.0 };
                };

                let stat = actor.modified_stat(ability.scaling_stat) as f64;
                let mut score = (stat * ability.power_multiplier).floor()
                    * affinity_multiplier(self.rule, ability.affinity, defender)
                    * ability.hits.mean();

                if ability.target == TargetScope::AllEnemies {
                    let standing = session
                        .team(side.opponent())
                        .members
                        .iter()
                        .filter(|member| !member.fainted)
                        .count();
                    score *= standing.max(1) as f64;
                }
                if let Some(status) = &ability.status_effect {
                    if !defender.status_effects.iter().any(|e| e.name == status.name) {
                        score += 10.0;
                    }
                }
                score
            }
            TargetScope::Ally | TargetScope::SelfOnly => {
                let missing = (actor.max_hp - actor.hp) as f64;
                let mut score = 0.0;
                if ability.is_healing() && actor.hp_percent() < 50.0 {
                    score += missing.min(calculate_heal(actor, ability) as f64);
                }
                if let Some(status) = &ability.status_effect {
                    let already = actor.status_effects.iter().any(|e| e.name == status.name);
                    if !already && status.kind != StatusKind::DamageOverTime {
                        score += 5.0;
                    }
                }
                score
            }
        }
    }
}

impl Behavior for ScoringAI {
    fn choose_ability(&self, session: &BattleSession, side: Side) -> Option<String> {
        let actor = session.active(side)?;

        let best = actor
            .active_abilities()
            .filter(|ability| ability.mp_cost <= actor.mp)
            .map(|ability| (ability, self.score(ability, session, side)))
            .max_by(|(a, score_a), (b, score_b)| {
                score_a
                    .total_cmp(score_b)
                    .then_with(|| a.priority.cmp(&b.priority))
            })
            .map(|(ability, _)| ability);

        // Nothing affordable: the first ability fails its MP gate and the turn moves on.
        best.or_else(|| actor.active_abilities().next())
            .map(|ability| ability.id.clone())
    }
}
