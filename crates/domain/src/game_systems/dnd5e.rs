//! D&D 5th Edition rules arithmetic
//!
//! Pure lookups and formulas: XP thresholds, ability modifiers, proficiency,
//! class hit dice, full-caster slot progression, and derived Armor Class.

use crate::entities::{Ability, ArmorProfile, ArmorWeight};

/// XP needed to reach each level (index 0 is level 1).
const XP_THRESHOLDS: [u32; 20] = [
    0,      // Level 1
    300,    // Level 2
    900,    // Level 3
    2700,   // Level 4
    6500,   // Level 5
    14000,  // Level 6
    23000,  // Level 7
    34000,  // Level 8
    48000,  // Level 9
    64000,  // Level 10
    85000,  // Level 11
    100000, // Level 12
    120000, // Level 13
    140000, // Level 14
    165000, // Level 15
    195000, // Level 16
    225000, // Level 17
    265000, // Level 18
    305000, // Level 19
    355000, // Level 20
];

pub const MAX_LEVEL: u8 = 20;

/// Highest a score may reach through ability score improvements.
pub const ABILITY_SCORE_CAP: i32 = 20;

/// Full-caster slots per character level (columns are spell levels 1-9).
const FULL_CASTER_SLOTS: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

const FULL_CASTERS: [&str; 5] = ["bard", "cleric", "druid", "sorcerer", "wizard"];

/// Levels that grant an ability score improvement.
const IMPROVEMENT_LEVELS: [u8; 5] = [4, 8, 12, 16, 19];

/// XP needed for the level after `current_level`; `None` at max level.
pub fn xp_for_next_level(current_level: u8) -> Option<u32> {
    if current_level == 0 || current_level >= MAX_LEVEL {
        return None;
    }
    XP_THRESHOLDS.get(usize::from(current_level)).copied()
}

pub fn level_from_xp(xp: u32) -> u8 {
    XP_THRESHOLDS
        .iter()
        .rposition(|threshold| xp >= *threshold)
        .map(|index| index as u8 + 1)
        .unwrap_or(1)
}

/// floor((score - 10) / 2); integer division alone rounds the wrong way for odd low scores.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

pub fn proficiency_bonus(level: u8) -> i32 {
    (i32::from(level.max(1)) - 1) / 4 + 2
}

pub fn hit_die(class_name: &str) -> u16 {
    match class_name.trim().to_lowercase().as_str() {
        "barbarian" => 12,
        "fighter" | "paladin" | "ranger" => 10,
        "sorcerer" | "wizard" => 6,
        _ => 8,
    }
}

pub fn class_save_proficiencies(class_name: &str) -> &'static [Ability] {
    use Ability::*;
    match class_name.trim().to_lowercase().as_str() {
        "barbarian" | "fighter" => &[Strength, Constitution],
        "bard" => &[Dexterity, Charisma],
        "cleric" | "warlock" => &[Wisdom, Charisma],
        "druid" | "wizard" => &[Intelligence, Wisdom],
        "monk" | "ranger" => &[Strength, Dexterity],
        "paladin" => &[Wisdom, Charisma],
        "rogue" => &[Dexterity, Intelligence],
        "sorcerer" => &[Constitution, Charisma],
        _ => &[],
    }
}

pub fn is_full_caster(class_name: &str) -> bool {
    let lowered = class_name.trim().to_lowercase();
    FULL_CASTERS.contains(&lowered.as_str())
}

/// Slot maxima for a full caster at `level`; `None` for other classes.
pub fn full_caster_slots(class_name: &str, level: u8) -> Option<&'static [u8]> {
    if !is_full_caster(class_name) || level == 0 {
        return None;
    }
    FULL_CASTER_SLOTS
        .get(usize::from(level.min(MAX_LEVEL)) - 1)
        .map(|row| row.as_slice())
}

pub fn grants_ability_improvement(level: u8) -> bool {
    IMPROVEMENT_LEVELS.contains(&level)
}

/// Everything Armor Class depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmorClassInputs<'a> {
    pub class_name: &'a str,
    pub dexterity_mod: i32,
    pub constitution_mod: i32,
    pub wisdom_mod: i32,
    /// Best equipped body armor
    pub armor: Option<ArmorProfile>,
    /// Sum of equipped shield bonuses
    pub shield_bonus: i32,
    /// Sum of active AC modifiers
    pub modifier_bonus: i32,
}

/// Derived AC: base armor, DEX capped by weight class, shield, then modifiers.
///
/// Unarmored barbarians add CON and unarmored monks add WIS.
pub fn armor_class(inputs: &ArmorClassInputs<'_>) -> i32 {
    let class = inputs.class_name.trim().to_lowercase();
    let base = match inputs.armor {
        Some(ArmorProfile {
            base_ac,
            weight: ArmorWeight::Light,
        }) => base_ac + inputs.dexterity_mod,
        Some(ArmorProfile {
            base_ac,
            weight: ArmorWeight::Medium,
        }) => base_ac + inputs.dexterity_mod.min(2),
        Some(ArmorProfile {
            base_ac,
            weight: ArmorWeight::Heavy,
        }) => base_ac,
        None => {
            let unarmored = 10 + inputs.dexterity_mod;
            match class.as_str() {
                "barbarian" => unarmored + inputs.constitution_mod,
                "monk" if inputs.shield_bonus == 0 => unarmored + inputs.wisdom_mod,
                _ => unarmored,
            }
        }
    };
    base.saturating_add(inputs.shield_bonus)
        .saturating_add(inputs.modifier_bonus)
}
