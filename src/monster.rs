use serde::{Deserialize, Serialize};

/// A creature owned by a player, as persisted outside the battle engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedMonster {
    pub id: String,
    pub template_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    // Abilities unlocked beyond the template's own list
    #[serde(default)]
    pub learned_abilities: Vec<String>,
}

impl OwnedMonster {
    pub fn new(id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template_id: template_id.into(),
            nickname: None,
            learned_abilities: Vec::new(),
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_learned(mut self, ability_ids: Vec<&str>) -> Self {
        self.learned_abilities = ability_ids.into_iter().map(String::from).collect();
        self
    }
}
