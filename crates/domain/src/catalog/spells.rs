//! Built-in spell catalogue

use crate::entities::{SpellDefinition, SpellDuration};

pub fn builtin_spells() -> Vec<SpellDefinition> {
    vec![
        SpellDefinition::new("fire-bolt", "Fire Bolt", 0),
        SpellDefinition::new("sacred-flame", "Sacred Flame", 0),
        SpellDefinition::new("guidance", "Guidance", 0)
            .concentration()
            .lasting(SpellDuration::rounds(10)),
        SpellDefinition::new("magic-missile", "Magic Missile", 1),
        SpellDefinition::new("cure-wounds", "Cure Wounds", 1).with_effect("HEAL[player|1d8+3]"),
        SpellDefinition::new("healing-word", "Healing Word", 1).with_effect("HEAL[player|1d4+3]"),
        SpellDefinition::new("false-life", "False Life", 1)
            .lasting(SpellDuration::hours(1))
            .with_effect("TEMP_HP[player|1d4+4]"),
        SpellDefinition::new("bless", "Bless", 1)
            .concentration()
            .lasting(SpellDuration::rounds(10))
            .with_effect("+1 attack rolls")
            .with_effect("+1 saving throws"),
        SpellDefinition::new("shield-of-faith", "Shield of Faith", 1)
            .concentration()
            .lasting(SpellDuration::rounds(100))
            .with_effect("+2 AC"),
        SpellDefinition::new("mage-armor", "Mage Armor", 1)
            .lasting(SpellDuration::hours(8))
            .with_effect("+3 AC"),
        SpellDefinition::new("shield", "Shield", 1)
            .lasting(SpellDuration::rounds(1))
            .with_effect("+5 AC"),
        SpellDefinition::new("protection-from-poison", "Protection from Poison", 2)
            .lasting(SpellDuration::hours(1))
            .with_effect("resistance to poison damage")
            .with_effect("advantage on poison saving throws"),
        SpellDefinition::new("haste", "Haste", 3)
            .concentration()
            .lasting(SpellDuration::rounds(10))
            .with_effect("+2 AC")
            .with_effect("advantage on dexterity saving throws"),
        SpellDefinition::new("protection-from-energy", "Protection from Energy", 3)
            .concentration()
            .lasting(SpellDuration::hours(1))
            .with_effect("resistance to fire damage"),
        SpellDefinition::new("fireball", "Fireball", 3),
    ]
}
