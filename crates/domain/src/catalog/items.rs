//! Built-in item catalogue

use crate::entities::{ArmorWeight, ItemCategory, ItemDefinition};

pub fn builtin_items() -> Vec<ItemDefinition> {
    use ItemCategory::*;

    vec![
        ItemDefinition::new("healing-potion", "Healing Potion", Consumable)
            .with_effect("HEAL[player|2d4+2]")
            .with_description("A vial of red liquid that knits wounds closed."),
        ItemDefinition::new("greater-healing-potion", "Greater Healing Potion", Consumable)
            .with_effect("HEAL[player|4d4+4]"),
        ItemDefinition::new("potion-of-vitality", "Potion of Vitality", Consumable)
            .with_effect("TEMP_HP[player|2d6]"),
        ItemDefinition::new("antitoxin", "Antitoxin", Consumable)
            .with_effect("STATUS_REMOVE[Poisoned]"),
        ItemDefinition::new("longsword", "Longsword", Weapon).with_damage("1d8"),
        ItemDefinition::new("shortsword", "Shortsword", Weapon).with_damage("1d6"),
        ItemDefinition::new("dagger", "Dagger", Weapon).with_damage("1d4"),
        ItemDefinition::new("greataxe", "Greataxe", Weapon).with_damage("1d12"),
        ItemDefinition::new("shortbow", "Shortbow", Weapon).with_damage("1d6"),
        ItemDefinition::new("quarterstaff", "Quarterstaff", Weapon).with_damage("1d6"),
        ItemDefinition::new("leather-armor", "Leather Armor", Armor)
            .with_armor(11, ArmorWeight::Light),
        ItemDefinition::new("studded-leather", "Studded Leather", Armor)
            .with_armor(12, ArmorWeight::Light),
        ItemDefinition::new("chain-shirt", "Chain Shirt", Armor)
            .with_armor(13, ArmorWeight::Medium),
        ItemDefinition::new("scale-mail", "Scale Mail", Armor)
            .with_armor(14, ArmorWeight::Medium),
        ItemDefinition::new("chain-mail", "Chain Mail", Armor)
            .with_armor(16, ArmorWeight::Heavy),
        ItemDefinition::new("plate-armor", "Plate Armor", Armor)
            .with_armor(18, ArmorWeight::Heavy),
        ItemDefinition::new("shield", "Shield", Shield).with_shield(2),
        ItemDefinition::new("ring-of-protection", "Ring of Protection", Magic)
            .with_effect("+1 AC")
            .with_effect("+1 saving throws"),
        ItemDefinition::new("cloak-of-protection", "Cloak of Protection", Magic)
            .with_effect("+1 AC")
            .with_effect("+1 saving throws"),
        ItemDefinition::new("ring-of-fire-resistance", "Ring of Fire Resistance", Magic)
            .with_effect("resistance to fire damage"),
        ItemDefinition::new("periapt-of-proof-against-poison", "Periapt of Proof against Poison", Magic)
            .with_effect("resistance to poison damage")
            .with_effect("advantage on poison saving throws"),
        ItemDefinition::new("rope", "Rope", Gear).with_description("50 feet of hempen rope."),
        ItemDefinition::new("torch", "Torch", Gear),
        ItemDefinition::new("rations", "Rations", Gear),
        ItemDefinition::new("thieves-tools", "Thieves Tools", Gear),
        ItemDefinition::new("gemstone", "Gemstone", Treasure),
    ]
}
