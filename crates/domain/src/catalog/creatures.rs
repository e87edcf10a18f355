//! Creature templates used to spawn encounter combatants

use serde::{Deserialize, Serialize};

use crate::value_objects::{DefenseCategory, Defenses};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureTemplate {
    pub name: String,
    pub max_hp: i32,
    pub armor_class: i32,
    pub dexterity: i32,
    #[serde(default)]
    pub defenses: Defenses,
}

impl CreatureTemplate {
    pub fn new(name: impl Into<String>, max_hp: i32, armor_class: i32, dexterity: i32) -> Self {
        Self {
            name: name.into(),
            max_hp,
            armor_class,
            dexterity,
            defenses: Defenses::default(),
        }
    }

    fn with(mut self, category: DefenseCategory, damage_type: &str) -> Self {
        self.defenses.add(category, damage_type);
        self
    }

    /// Stand-in stats for creatures nobody has described.
    pub fn generic(name: impl Into<String>) -> Self {
        Self::new(name, 10, 12, 10)
    }
}

pub fn builtin_creatures() -> Vec<CreatureTemplate> {
    use DefenseCategory::*;

    vec![
        CreatureTemplate::new("Goblin", 7, 15, 14),
        CreatureTemplate::new("Bandit", 11, 12, 12),
        CreatureTemplate::new("Wolf", 11, 13, 15),
        CreatureTemplate::new("Orc", 15, 13, 12),
        CreatureTemplate::new("Skeleton", 13, 13, 14)
            .with(Vulnerability, "bludgeoning")
            .with(Immunity, "poison"),
        CreatureTemplate::new("Zombie", 22, 8, 6).with(Immunity, "poison"),
        CreatureTemplate::new("Fire Elemental", 102, 13, 17)
            .with(Immunity, "fire")
            .with(Immunity, "poison")
            .with(Resistance, "bludgeoning"),
        CreatureTemplate::new("Ogre", 59, 11, 8),
    ]
}
