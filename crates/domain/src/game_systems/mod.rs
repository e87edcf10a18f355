//! Game rules: 5e arithmetic and the mechanics service

pub mod dnd5e;
pub mod mechanics;

pub use mechanics::{apply_damage, apply_temp_hp, check_concentration, ConcentrationCheck, DamageOutcome};
