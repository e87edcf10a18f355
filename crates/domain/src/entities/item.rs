//! Item definitions and the catalogues that resolve them

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemCategory {
    Weapon,
    Armor,
    Shield,
    Consumable,
    Magic,
    Gear,
    Treasure,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Shield => "shield",
            Self::Consumable => "consumable",
            Self::Magic => "magic item",
            Self::Gear => "gear",
            Self::Treasure => "treasure",
        };
        f.write_str(label)
    }
}

/// Body armor weight class; decides how much DEX counts toward AC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmorProfile {
    pub base_ac: i32,
    pub weight: ArmorWeight,
}

/// A catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<ArmorProfile>,
    /// AC granted by a shield
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    #[serde(default)]
    pub consumable: bool,
    /// Free-text effects ("+1 AC", "HEAL[player|2d4+2]")
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// True while the definition is a stand-in awaiting generation
    #[serde(default)]
    pub placeholder: bool,
}

impl ItemDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            armor: None,
            shield_bonus: None,
            damage: None,
            consumable: category == ItemCategory::Consumable,
            effects: Vec::new(),
            description: String::new(),
            placeholder: false,
        }
    }

    pub fn with_armor(mut self, base_ac: i32, weight: ArmorWeight) -> Self {
        self.armor = Some(ArmorProfile { base_ac, weight });
        self
    }

    pub fn with_shield(mut self, bonus: i32) -> Self {
        self.shield_bonus = Some(bonus);
        self
    }

    pub fn with_damage(mut self, dice: impl Into<String>) -> Self {
        self.damage = Some(dice.into());
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Source id under which this item's passive modifiers are stored.
    pub fn source_id(&self) -> String {
        item_source_id(&self.id)
    }

    /// Case-insensitive match on id or name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.id.eq_ignore_ascii_case(query) || self.name.eq_ignore_ascii_case(query)
    }
}

pub fn item_source_id(item_id: &str) -> String {
    format!("item:{}", item_id)
}

/// Lowercase, hyphen-separated id derived from a display name.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_id_or_name_ignoring_case() {
        let item = ItemDefinition::new("healing-potion", "Healing Potion", ItemCategory::Consumable);
        assert!(item.matches("healing potion"));
        assert!(item.matches("HEALING-POTION"));
        assert!(!item.matches("potion"));
        assert!(item.consumable);
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Thieves' Tools"), "thieves-tools");
        assert_eq!(slugify("  Ring of  Protection +1 "), "ring-of-protection-1");
    }
}
