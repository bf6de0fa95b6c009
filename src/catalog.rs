//! Read-only creature and ability catalog consumed by the battle engine.

use crate::errors::{CatalogError, CatalogResult};
use schema::{AbilityData, MonsterTemplate};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Lookup interface over the persisted catalog. The engine never mutates it.
pub trait Catalog: Send + Sync {
    fn monster(&self, template_id: &str) -> Option<&MonsterTemplate>;
    fn ability(&self, ability_id: &str) -> Option<&AbilityData>;

    fn require_monster(&self, template_id: &str) -> CatalogResult<&MonsterTemplate> {
        self.monster(template_id)
            .ok_or_else(|| CatalogError::MonsterNotFound(template_id.to_string()))
    }

    fn require_ability(&self, ability_id: &str) -> CatalogResult<&AbilityData> {
        self.ability(ability_id)
            .ok_or_else(|| CatalogError::AbilityNotFound(ability_id.to_string()))
    }
}

/// In-memory catalog, usually loaded from `monsters.ron` and `abilities.ron`.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    monsters: HashMap<String, MonsterTemplate>,
    abilities: HashMap<String, AbilityData>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(monsters: Vec<MonsterTemplate>, abilities: Vec<AbilityData>) -> Self {
        let mut catalog = Self::new();
        for monster in monsters {
            catalog.insert_monster(monster);
        }
        for ability in abilities {
            catalog.insert_ability(ability);
        }
        catalog
    }

    /// Load the catalog from `<data_dir>/monsters.ron` and `<data_dir>/abilities.ron`.
    pub fn load_from_dir(data_dir: &Path) -> CatalogResult<Self> {
        let monsters: Vec<MonsterTemplate> =
            ron::from_str(&fs::read_to_string(data_dir.join("monsters.ron"))?)?;
        let abilities: Vec<AbilityData> =
            ron::from_str(&fs::read_to_string(data_dir.join("abilities.ron"))?)?;

        let catalog = Self::from_parts(monsters, abilities);
        catalog.validate()?;
        tracing::info!(
            monsters = catalog.monsters.len(),
            abilities = catalog.abilities.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn insert_monster(&mut self, monster: MonsterTemplate) {
        self.monsters.insert(monster.id.clone(), monster);
    }

    pub fn insert_ability(&mut self, ability: AbilityData) {
        self.abilities.insert(ability.id.clone(), ability);
    }

    pub fn monster_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.monsters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Every ability referenced by a template must exist.
    pub fn validate(&self) -> CatalogResult<()> {
        for monster in self.monsters.values() {
            for ability_id in &monster.abilities {
                self.require_ability(ability_id)?;
            }
        }
        for ability in self.abilities.values() {
            let hits = ability.hits;
            if hits.min == 0 || hits.min > hits.max {
                return Err(CatalogError::InvalidHitRange {
                    ability_id: ability.id.clone(),
                    min: hits.min,
                    max: hits.max,
                });
            }
        }
        Ok(())
    }
}

impl Catalog for StaticCatalog {
    fn monster(&self, template_id: &str) -> Option<&MonsterTemplate> {
        self.monsters.get(template_id)
    }

    fn ability(&self, ability_id: &str) -> Option<&AbilityData> {
        self.abilities.get(ability_id)
    }
}
