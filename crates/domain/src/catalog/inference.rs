//! Rule-based item inference from a bare name
//!
//! Used for placeholders while a generated definition is pending, and as the
//! fallback when no generator is available.

use crate::entities::{ArmorWeight, ItemCategory, ItemDefinition};

fn mentions(lowered: &str, words: &[&str]) -> bool {
    words.iter().any(|word| lowered.contains(word))
}

pub fn infer_item(id: impl Into<String>, name: &str) -> ItemDefinition {
    let lowered = name.to_lowercase();
    let display = name.trim();

    if mentions(&lowered, &["potion", "elixir", "draught", "tonic"]) {
        let item = ItemDefinition::new(id, display, ItemCategory::Consumable);
        return if mentions(&lowered, &["heal", "cure", "vitality"]) {
            item.with_effect("HEAL[player|2d4+2]")
        } else {
            item
        };
    }
    if mentions(&lowered, &["shield", "buckler"]) {
        return ItemDefinition::new(id, display, ItemCategory::Shield).with_shield(2);
    }
    if mentions(&lowered, &["plate"]) {
        return ItemDefinition::new(id, display, ItemCategory::Armor)
            .with_armor(18, ArmorWeight::Heavy);
    }
    if mentions(&lowered, &["chain shirt", "breastplate", "scale", "hide"]) {
        return ItemDefinition::new(id, display, ItemCategory::Armor)
            .with_armor(13, ArmorWeight::Medium);
    }
    if mentions(&lowered, &["mail", "splint"]) {
        return ItemDefinition::new(id, display, ItemCategory::Armor)
            .with_armor(16, ArmorWeight::Heavy);
    }
    if mentions(&lowered, &["leather", "armor", "armour", "padded"]) {
        return ItemDefinition::new(id, display, ItemCategory::Armor)
            .with_armor(11, ArmorWeight::Light);
    }
    if mentions(&lowered, &["greataxe", "greatsword", "maul"]) {
        return ItemDefinition::new(id, display, ItemCategory::Weapon).with_damage("1d12");
    }
    if mentions(&lowered, &["sword", "axe", "mace", "hammer", "spear", "bow", "staff"]) {
        return ItemDefinition::new(id, display, ItemCategory::Weapon).with_damage("1d8");
    }
    if mentions(&lowered, &["dagger", "knife", "dart", "sling"]) {
        return ItemDefinition::new(id, display, ItemCategory::Weapon).with_damage("1d4");
    }
    if mentions(&lowered, &["ring", "amulet", "cloak", "wand", "periapt", "talisman"]) {
        return ItemDefinition::new(id, display, ItemCategory::Magic);
    }
    if mentions(&lowered, &["gem", "coin", "jewel", "gold", "pearl"]) {
        return ItemDefinition::new(id, display, ItemCategory::Treasure);
    }
    ItemDefinition::new(id, display, ItemCategory::Gear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_common_categories() {
        let potion = infer_item("p", "Potion of Minor Healing");
        assert!(potion.consumable);
        assert_eq!(potion.effects, vec!["HEAL[player|2d4+2]".to_string()]);

        let armor = infer_item("a", "Dwarven Plate");
        assert_eq!(armor.armor.map(|a| a.weight), Some(ArmorWeight::Heavy));

        let sword = infer_item("s", "Moonlit Sword");
        assert_eq!(sword.category, ItemCategory::Weapon);

        assert_eq!(infer_item("b", "Silver Buckler").shield_bonus, Some(2));
        assert_eq!(infer_item("r", "Ring of Whispers").category, ItemCategory::Magic);
        assert_eq!(infer_item("x", "Strange Idol").category, ItemCategory::Gear);
    }
}
