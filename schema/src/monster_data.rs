use crate::{Affinity, StatType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub mp: u32,
    pub power: u32,
    pub defense: u32,
    pub speed: u32,
}

impl BaseStats {
    pub fn get(&self, stat: StatType) -> u32 {
        match stat {
            StatType::Power => self.power,
            StatType::Defense => self.defense,
            StatType::Speed => self.speed,
        }
    }
}

/// Catalog entry for a creature species. Read-only during a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub affinity: Affinity,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub weaknesses: Vec<Affinity>,
    #[serde(default)]
    pub resistances: Vec<Affinity>,
    // Ability ids, resolved against the ability catalog
    pub abilities: Vec<String>,
}
