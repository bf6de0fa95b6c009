//! In-combat representation of an owned creature.

use crate::battle::effects::{ActiveEffect, StatusEffect};
use crate::battle::state::Side;
use crate::catalog::Catalog;
use crate::errors::CatalogResult;
use crate::monster::OwnedMonster;
use schema::{AbilityData, ModifierKind, MonsterTemplate, StatType, StatusKind, TriggerPhase};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleCombatant {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub hp: u32,
    pub max_hp: u32,
    pub mp: u32,
    pub max_mp: u32,
    pub fainted: bool,
    pub template: MonsterTemplate,
    // Resolved ability data, template abilities first, then learned ones
    pub abilities: Vec<AbilityData>,
    pub active_effects: Vec<ActiveEffect>,
    pub status_effects: Vec<StatusEffect>,
}

impl BattleCombatant {
    /// Build a combatant from an owned record, merging its catalog template and
    /// learned abilities. Battle-scoped HP and MP start full.
    pub fn from_owned(owned: &OwnedMonster, side: Side, catalog: &dyn Catalog) -> CatalogResult<Self> {
        let template = catalog.require_monster(&owned.template_id)?.clone();

        let mut ability_ids: Vec<&str> = template.abilities.iter().map(String::as_str).collect();
        for learned in &owned.learned_abilities {
            if !ability_ids.contains(&learned.as_str()) {
                ability_ids.push(learned);
            }
        }
        let abilities = ability_ids
            .into_iter()
            .map(|id| catalog.require_ability(id).cloned())
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Self::new(
            owned.id.clone(),
            owned.nickname.clone().unwrap_or_else(|| template.name.clone()),
            side,
            template,
            abilities,
        ))
    }

    pub fn new(id: String, name: String, side: Side, mut template: MonsterTemplate, abilities: Vec<AbilityData>) -> Self {
        template.abilities = abilities.iter().map(|ability| ability.id.clone()).collect();
        let max_hp = template.base_stats.hp;
        let max_mp = template.base_stats.mp;
        Self {
            id,
            name,
            side,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            fainted: false,
            template,
            abilities,
            active_effects: Vec::new(),
            status_effects: Vec::new(),
        }
    }

    /// Base stat with every active modifier and stat-modifier status applied.
    /// Flat modifiers are summed first, then the summed percentage is applied.
    pub fn modified_stat(&self, stat: StatType) -> u32 {
        let base = self.template.base_stats.get(stat) as f64;

        let from_effects = self
            .active_effects
            .iter()
            .filter(|effect| effect.stat == stat)
            .map(|effect| (effect.kind, effect.value));
        let from_statuses = self.status_effects.iter().filter_map(|effect| match effect.kind {
            StatusKind::StatModifier { stat: s, kind } if s == stat => Some((kind, effect.value)),
            _ => None,
        });

        let (mut flat, mut percent) = (0.0, 0.0);
        for (kind, value) in from_effects.chain(from_statuses) {
            match kind {
                ModifierKind::Flat => flat += value,
                ModifierKind::Percentage => percent += value,
            }
        }

        ((base + flat) * (1.0 + percent / 100.0)).floor().max(0.0) as u32
    }

    /// Remove HP, never below zero. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        dealt
    }

    /// Restore HP, never above max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.fainted {
            return 0;
        }
        let healed = amount.min(self.max_hp - self.hp);
        self.hp += healed;
        healed
    }

    pub fn hp_percent(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f64 * 100.0 / self.max_hp as f64
    }

    /// Mark as fainted if HP has reached zero. Returns true on the transition.
    pub fn check_faint(&mut self) -> bool {
        if self.hp > 0 || self.fainted {
            return false;
        }
        self.fainted = true;
        self.active_effects.clear();
        self.status_effects.clear();
        true
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status_effects.iter().any(|effect| effect.kind == kind)
    }

    pub fn status_of_kind(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.status_effects.iter().find(|effect| effect.kind == kind)
    }

    pub fn find_ability(&self, ability_id: &str) -> Option<&AbilityData> {
        self.abilities.iter().find(|ability| ability.id == ability_id)
    }

    pub fn active_abilities(&self) -> impl Iterator<Item = &AbilityData> {
        self.abilities.iter().filter(|ability| !ability.is_passive())
    }

    /// Passives for one trigger phase, highest priority first.
    pub fn passives(&self, phase: TriggerPhase) -> Vec<&AbilityData> {
        let mut passives: Vec<&AbilityData> = self
            .abilities
            .iter()
            .filter(|ability| ability.passive_trigger().map(|t| t.phase()) == Some(phase))
            .collect();
        passives.sort_by(|a, b| b.priority.cmp(&a.priority));
        passives
    }

    pub fn is_weak_to(&self, affinity: schema::Affinity) -> bool {
        self.template.weaknesses.contains(&affinity)
    }

    pub fn resists(&self, affinity: schema::Affinity) -> bool {
        self.template.resistances.contains(&affinity)
    }
}

impl fmt::Display for BattleCombatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} HP {}/{} MP {}/{}",
            self.name, self.hp, self.max_hp, self.mp, self.max_mp
        )?;
        if self.fainted {
            write!(f, " (fainted)")?;
        }
        Ok(())
    }
}
