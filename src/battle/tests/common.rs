use crate::battle::combatant::BattleCombatant;
use crate::battle::effects::StatusEffect;
use crate::battle::state::{BattleRng, BattleSession, EngineContext, Side};
use crate::catalog::StaticCatalog;
use crate::config::{AffinityRule, EngineConfig};
use crate::monster::OwnedMonster;
use crate::persistence::InMemoryRosterStore;
use crate::session::SessionStore;
use schema::{
    AbilityData, AbilityKind, ActivationScope, Affinity, BaseStats, HitRange, MonsterTemplate,
    PassiveTarget, PassiveTrigger, StatType, StatusEffectTemplate, TargetScope,
};
use std::sync::Arc;
use uuid::Uuid;

/// A builder for test combatants with round-number defaults.
///
/// # Example
/// ```ignore
/// let tank = TestCombatantBuilder::new("tank")
///     .with_max_hp(500)
///     .resists(Affinity::Fire)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    id: String,
    affinity: Affinity,
    stats: BaseStats,
    hp: Option<u32>,
    mp: Option<u32>,
    weaknesses: Vec<Affinity>,
    resistances: Vec<Affinity>,
    abilities: Option<Vec<AbilityData>>,
    statuses: Vec<StatusEffectTemplate>,
    fainted: bool,
}

impl TestCombatantBuilder {
    /// 100 HP, 50 MP and 50 in every other stat.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            affinity: Affinity::Physical,
            stats: BaseStats { hp: 100, mp: 50, power: 50, defense: 50, speed: 50 },
            hp: None,
            mp: None,
            weaknesses: Vec::new(),
            resistances: Vec::new(),
            abilities: None,
            statuses: Vec::new(),
            fainted: false,
        }
    }

    pub fn with_max_hp(mut self, max_hp: u32) -> Self {
        self.stats.hp = max_hp;
        self
    }

    /// Current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    /// Current MP. If not set, MP will be max.
    pub fn with_mp(mut self, mp: u32) -> Self {
        self.mp = Some(mp);
        self
    }

    pub fn with_power(mut self, power: u32) -> Self {
        self.stats.power = power;
        self
    }

    pub fn with_speed(mut self, speed: u32) -> Self {
        self.stats.speed = speed;
        self
    }

    pub fn with_affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn weak_to(mut self, affinity: Affinity) -> Self {
        self.weaknesses.push(affinity);
        self
    }

    pub fn resists(mut self, affinity: Affinity) -> Self {
        self.resistances.push(affinity);
        self
    }

    /// Replaces the default single `strike` ability.
    pub fn with_abilities(mut self, abilities: Vec<AbilityData>) -> Self {
        self.abilities = Some(abilities);
        self
    }

    pub fn with_status(mut self, status: StatusEffectTemplate) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn fainted(mut self) -> Self {
        self.fainted = true;
        self
    }

    pub fn build(self) -> BattleCombatant {
        let template = MonsterTemplate {
            id: self.id.clone(),
            name: self.id.clone(),
            affinity: self.affinity,
            base_stats: self.stats,
            weaknesses: self.weaknesses,
            resistances: self.resistances,
            abilities: Vec::new(),
        };
        let abilities = self
            .abilities
            .unwrap_or_else(|| vec![ability("strike", 1.0, Affinity::Physical, TargetScope::SingleEnemy)]);

        let mut combatant = BattleCombatant::new(self.id.clone(), self.id, Side::Player, template, abilities);
        if let Some(hp) = self.hp {
            combatant.hp = hp.min(combatant.max_hp);
        }
        if let Some(mp) = self.mp {
            combatant.mp = mp;
        }
        for status in &self.statuses {
            combatant.status_effects.push(StatusEffect::from_template(status));
        }
        if self.fainted {
            combatant.hp = 0;
            combatant.fainted = true;
        }
        combatant
    }
}

/// An active ability with no MP cost and no effects beyond its damage.
pub fn ability(id: &str, power_multiplier: f64, affinity: Affinity, target: TargetScope) -> AbilityData {
    AbilityData {
        id: id.to_string(),
        name: id.to_string(),
        kind: AbilityKind::Active,
        mp_cost: 0,
        affinity,
        power_multiplier,
        scaling_stat: StatType::Power,
        healing_power: 0.0,
        target,
        hits: HitRange::default(),
        priority: 0,
        stat_modifiers: Vec::new(),
        status_effect: None,
    }
}

/// A passive with no effects yet; callers fill in modifiers, status or healing.
pub fn passive(id: &str, trigger: PassiveTrigger, scope: ActivationScope, target: PassiveTarget) -> AbilityData {
    AbilityData {
        kind: AbilityKind::Passive {
            trigger,
            scope,
            target,
            heal_percent: None,
        },
        ..ability(id, 0.0, Affinity::Physical, TargetScope::SelfOnly)
    }
}

/// A session with scripted rng and fixed sides. The player moves first.
pub fn create_test_session(player: Vec<BattleCombatant>, ai: Vec<BattleCombatant>) -> BattleSession {
    create_test_session_with_rng(player, ai, vec![])
}

pub fn create_test_session_with_rng(
    mut player: Vec<BattleCombatant>,
    mut ai: Vec<BattleCombatant>,
    outcomes: Vec<u8>,
) -> BattleSession {
    for combatant in &mut player {
        combatant.side = Side::Player;
    }
    for combatant in &mut ai {
        combatant.side = Side::Ai;
    }
    BattleSession::new(Uuid::new_v4(), player, ai, BattleRng::new_for_test(outcomes))
}

pub fn test_context(store: &InMemoryRosterStore) -> EngineContext<'_> {
    EngineContext {
        affinity_rule: AffinityRule::MonsterLists,
        roster_store: store,
    }
}

/// Three small templates: emberling (fast), tidecaller (fastest), stonehide (slow).
pub fn test_catalog() -> StaticCatalog {
    let template = |id: &str, name: &str, affinity, speed, abilities: &[&str]| MonsterTemplate {
        id: id.to_string(),
        name: name.to_string(),
        affinity,
        base_stats: BaseStats { hp: 100, mp: 40, power: 50, defense: 30, speed },
        weaknesses: Vec::new(),
        resistances: Vec::new(),
        abilities: abilities.iter().map(|id| id.to_string()).collect(),
    };

    let mut flurry = ability("flurry", 0.5, Affinity::Physical, TargetScope::SingleEnemy);
    flurry.mp_cost = 5;
    flurry.hits = HitRange { min: 2, max: 4 };
    let mut mend = ability("mend", 0.0, Affinity::Nature, TargetScope::Ally);
    mend.mp_cost = 5;
    mend.healing_power = 0.5;

    StaticCatalog::from_parts(
        vec![
            template("emberling", "Emberling", Affinity::Fire, 60, &["strike"]),
            template("tidecaller", "Tidecaller", Affinity::Water, 70, &["strike", "mend"]),
            template("stonehide", "Stonehide", Affinity::Earth, 20, &["strike"]),
        ],
        vec![
            ability("strike", 1.0, Affinity::Physical, TargetScope::SingleEnemy),
            flurry,
            mend,
        ],
    )
}

/// Owned records for the given template ids.
pub fn roster(template_ids: &[&str]) -> Vec<OwnedMonster> {
    template_ids
        .iter()
        .enumerate()
        .map(|(index, template_id)| OwnedMonster::new(format!("{}-{}", template_id, index), *template_id))
        .collect()
}

/// A store over [`test_catalog`] with default config, plus its roster store.
pub fn test_store() -> (SessionStore, Arc<InMemoryRosterStore>) {
    let roster_store = Arc::new(InMemoryRosterStore::new());
    let store = SessionStore::new(Arc::new(test_catalog()), roster_store.clone(), EngineConfig::default());
    (store, roster_store)
}
