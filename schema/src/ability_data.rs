use crate::Affinity;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum StatType {
    Power,
    Defense,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModifierKind {
    #[default]
    Flat,
    Percentage,
}

/// How a status effect's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValueKind {
    #[default]
    Flat,
    PercentOfMaxHp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifierTemplate {
    pub stat: StatType,
    #[serde(default)]
    pub kind: ModifierKind,
    pub value: f64,
    pub duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    DamageOverTime,
    HealingOverTime,
    /// Owner loses its turn while the effect lasts (paralysis, sleep).
    TurnSkip,
    /// `value` is a percent chance to avoid an incoming enemy ability.
    Evasion,
    /// Owner hits itself for `secondary_value` of its power instead of acting.
    Confusion,
    StatModifier { stat: StatType, kind: ModifierKind },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectTemplate {
    pub name: String,
    pub duration: u32,
    pub kind: StatusKind,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub value_kind: ValueKind,
    #[serde(default)]
    pub secondary_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetScope {
    #[default]
    SingleEnemy,
    /// Every non-fainted opponent, benched members included.
    AllEnemies,
    /// Explicit ally if given, otherwise the user.
    Ally,
    SelfOnly,
}

impl TargetScope {
    pub fn targets_enemies(self) -> bool {
        matches!(self, TargetScope::SingleEnemy | TargetScope::AllEnemies)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRange {
    pub min: u8,
    pub max: u8,
}

impl Default for HitRange {
    fn default() -> Self {
        Self { min: 1, max: 1 }
    }
}

impl HitRange {
    pub fn is_multi_hit(&self) -> bool {
        self.max > 1
    }

    pub fn mean(&self) -> f64 {
        (self.min as f64 + self.max.max(self.min) as f64) / 2.0
    }
}

/// When a passive ability fires. Variants carry the parameters their trigger needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PassiveTrigger {
    BattleStart,
    StartOfTurn,
    /// Owner uses an ability; `affinity` restricts which abilities count.
    OnAbilityUse { affinity: Option<Affinity> },
    /// Owner is targeted by an enemy ability; rolls `chance` percent to evade it.
    OnBeingHit { chance: u8, affinity: Option<Affinity> },
    OnDamageTaken,
    /// Owner's HP percentage is at or below `percent`.
    OnHpThreshold { percent: u8 },
    EndOfTurn,
}

/// Payload-free discriminant of [`PassiveTrigger`], used to look passives up per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPhase {
    BattleStart,
    StartOfTurn,
    OnAbilityUse,
    OnBeingHit,
    OnDamageTaken,
    OnHpThreshold,
    EndOfTurn,
}

impl PassiveTrigger {
    pub fn phase(&self) -> TriggerPhase {
        match self {
            PassiveTrigger::BattleStart => TriggerPhase::BattleStart,
            PassiveTrigger::StartOfTurn => TriggerPhase::StartOfTurn,
            PassiveTrigger::OnAbilityUse { .. } => TriggerPhase::OnAbilityUse,
            PassiveTrigger::OnBeingHit { .. } => TriggerPhase::OnBeingHit,
            PassiveTrigger::OnDamageTaken => TriggerPhase::OnDamageTaken,
            PassiveTrigger::OnHpThreshold { .. } => TriggerPhase::OnHpThreshold,
            PassiveTrigger::EndOfTurn => TriggerPhase::EndOfTurn,
        }
    }
}

/// Where a combatant currently stands on its team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Active,
    Benched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActivationScope {
    #[default]
    ActiveOnly,
    BenchOnly,
    Any,
}

impl ActivationScope {
    pub fn admits(self, position: Position) -> bool {
        match (self, position) {
            (ActivationScope::Any, _) => true,
            (ActivationScope::ActiveOnly, Position::Active) => true,
            (ActivationScope::BenchOnly, Position::Benched) => true,
            _ => false,
        }
    }
}

/// Who receives the effects of a passive when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PassiveTarget {
    #[default]
    Owner,
    ActiveAlly,
    Team,
    ActiveOpponent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbilityKind {
    Active,
    Passive {
        trigger: PassiveTrigger,
        #[serde(default)]
        scope: ActivationScope,
        #[serde(default)]
        target: PassiveTarget,
        #[serde(default)]
        heal_percent: Option<f64>,
    },
}

fn default_scaling_stat() -> StatType {
    StatType::Power
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityData {
    pub id: String,
    pub name: String,
    pub kind: AbilityKind,
    #[serde(default)]
    pub mp_cost: u32,
    #[serde(default)]
    pub affinity: Affinity,
    #[serde(default)]
    pub power_multiplier: f64,
    #[serde(default = "default_scaling_stat")]
    pub scaling_stat: StatType,
    #[serde(default)]
    pub healing_power: f64,
    #[serde(default)]
    pub target: TargetScope,
    #[serde(default)]
    pub hits: HitRange,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub stat_modifiers: Vec<StatModifierTemplate>,
    #[serde(default)]
    pub status_effect: Option<StatusEffectTemplate>,
}

impl AbilityData {
    pub fn is_passive(&self) -> bool {
        matches!(self.kind, AbilityKind::Passive { .. })
    }

    pub fn passive_trigger(&self) -> Option<&PassiveTrigger> {
        match &self.kind {
            AbilityKind::Passive { trigger, .. } => Some(trigger),
            AbilityKind::Active => None,
        }
    }

    pub fn is_damaging(&self) -> bool {
        self.power_multiplier > 0.0
    }

    pub fn is_healing(&self) -> bool {
        self.healing_power > 0.0
    }
}

impl fmt::Display for AbilityData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
