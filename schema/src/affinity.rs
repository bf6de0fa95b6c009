use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Damage category used to look up weakness/resistance multipliers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Affinity {
    Physical,
    Psychic,
    Fire,
    Water,
    Earth,
    Electric,
    Air,
    Nature,
}

impl Default for Affinity {
    fn default() -> Self {
        Affinity::Physical
    }
}

impl Affinity {
    /// Fixed elemental chart multiplier for an attacking affinity against a defending one.
    /// Returns: 2.0 = strong against, 1.0 = neutral, 0.5 = weak against.
    pub fn chart_multiplier(attacking: Affinity, defending: Affinity) -> f64 {
        if Self::beats(attacking, defending) {
            2.0
        } else if Self::beats(defending, attacking) {
            0.5
        } else {
            1.0
        }
    }

    fn beats(attacking: Affinity, defending: Affinity) -> bool {
        use Affinity::*;

        matches!(
            (attacking, defending),
            (Earth, Electric)
                | (Water, Earth)
                | (Water, Fire)
                | (Fire, Nature)
                | (Nature, Water)
                | (Nature, Earth)
                | (Electric, Water)
                | (Electric, Air)
                | (Air, Nature)
                | (Physical, Psychic)
        )
    }
}
