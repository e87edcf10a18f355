//! The player's persistent character sheet
//!
//! Outlives any single session. Directive handlers mutate it and leveling
//! reads and writes the same record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resources::{ClassResource, HitDice, SpellSlots};
use crate::error::DomainError;
use crate::game_systems::dnd5e;
use crate::ids::CharacterId;
use crate::value_objects::{ActiveModifiers, Defenses, Susceptibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Strength => "STR",
            Self::Dexterity => "DEX",
            Self::Constitution => "CON",
            Self::Intelligence => "INT",
            Self::Wisdom => "WIS",
            Self::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Ok(Self::Strength),
            "dex" | "dexterity" => Ok(Self::Dexterity),
            "con" | "constitution" => Ok(Self::Constitution),
            "int" | "intelligence" => Ok(Self::Intelligence),
            "wis" | "wisdom" => Ok(Self::Wisdom),
            "cha" | "charisma" => Ok(Self::Charisma),
            other => Err(DomainError::parse(format!("Unknown ability: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        dnd5e::ability_modifier(self.get(ability))
    }
}

/// One line of the XP audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpEntry {
    pub amount: u32,
    pub reason: String,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    pub id: CharacterId,
    pub name: String,
    pub class_name: String,
    pub level: u8,
    pub abilities: AbilityScores,
    #[serde(default)]
    pub save_proficiencies: Vec<Ability>,
    /// Derived; recomputed whenever equipment or AC modifiers change
    pub armor_class: i32,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub temp_hp: i32,
    pub hit_dice: HitDice,
    #[serde(default)]
    pub spell_slots: SpellSlots,
    #[serde(default)]
    pub resources: Vec<ClassResource>,
    #[serde(default)]
    pub known_spells: Vec<String>,
    #[serde(default)]
    pub prepared_spells: Vec<String>,
    #[serde(default)]
    pub modifiers: ActiveModifiers,
    #[serde(default)]
    pub defenses: Defenses,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub xp_log: Vec<XpEntry>,
}

impl CharacterState {
    /// A fresh level-1 character with class defaults applied.
    pub fn new(name: impl Into<String>, class_name: impl Into<String>, abilities: AbilityScores) -> Self {
        let class_name = class_name.into();
        let die_size = dnd5e::hit_die(&class_name);
        let con = dnd5e::ability_modifier(abilities.constitution);
        let max_hp = (i32::from(die_size) + con).max(1);
        let spell_slots = dnd5e::full_caster_slots(&class_name, 1)
            .map(SpellSlots::from_maxima)
            .unwrap_or_default();

        Self {
            id: CharacterId::new(),
            name: name.into(),
            save_proficiencies: dnd5e::class_save_proficiencies(&class_name).to_vec(),
            class_name,
            level: 1,
            armor_class: 10 + dnd5e::ability_modifier(abilities.dexterity),
            abilities,
            hp: max_hp,
            max_hp,
            temp_hp: 0,
            hit_dice: HitDice::new(1, die_size),
            spell_slots,
            resources: Vec::new(),
            known_spells: Vec::new(),
            prepared_spells: Vec::new(),
            modifiers: ActiveModifiers::new(),
            defenses: Defenses::default(),
            xp: 0,
            xp_log: Vec::new(),
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    pub fn proficiency_bonus(&self) -> i32 {
        dnd5e::proficiency_bonus(self.level)
    }

    pub fn is_proficient_in_save(&self, ability: Ability) -> bool {
        self.save_proficiencies.contains(&ability)
    }

    /// Intrinsic defenses plus resistances granted by active modifiers.
    pub fn susceptibility(&self, damage_type: &str) -> Susceptibility {
        let mut susceptibility = self.defenses.susceptibility(damage_type);
        susceptibility.resistant |= self.modifiers.grants_resistance(damage_type);
        susceptibility
    }

    /// Heal up to max; returns hit points actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Remove hit points, clamped at zero; returns hit points actually lost.
    pub fn lose_hp(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp - amount.max(0)).max(0);
        before - self.hp
    }

    pub fn find_resource_mut(&mut self, name: &str) -> Option<&mut ClassResource> {
        self.resources
            .iter_mut()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn xp_for_next_level(&self) -> Option<u32> {
        dnd5e::xp_for_next_level(self.level)
    }

    pub fn can_level_up(&self) -> bool {
        self.xp_for_next_level()
            .map(|threshold| self.xp >= threshold)
            .unwrap_or(false)
    }
}
