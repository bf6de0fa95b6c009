// Monster Battle Schema - Shared catalog definitions
// This crate holds the read-only catalog types (creature templates, abilities,
// affinities) shared by the battle engine and anything that authors catalog data.

pub use ability_data::*;
pub use affinity::*;
pub use monster_data::*;

pub mod ability_data;
pub mod affinity;
pub mod monster_data;
