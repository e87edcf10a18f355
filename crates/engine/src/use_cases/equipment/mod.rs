//! Equipment and derived stats.
//!
//! Item identity resolves against the global catalogue first, then the
//! session catalogue. Armor Class is always re-derived from the full equipped
//! set plus active modifiers, never adjusted incrementally.

use chronicler_domain::catalog::Catalog;
use chronicler_domain::entities::item_source_id;
use chronicler_domain::game_systems::dnd5e::{self, ArmorClassInputs};
use chronicler_domain::{
    Ability, CharacterState, ItemCategory, ItemDefinition, ModifierTarget, SessionState,
};

use crate::use_cases::effects::resolve_effects;

/// Resolve by id or case-insensitive name: global catalogue, then session catalogue.
pub fn resolve_item(catalog: &Catalog, session: &SessionState, query: &str) -> Option<ItemDefinition> {
    catalog
        .item(query)
        .or_else(|| session.catalog.iter().find(|item| item.matches(query)))
        .cloned()
}

/// Definitions of every equipped inventory slot that still resolves.
pub fn equipped_items(catalog: &Catalog, session: &SessionState) -> Vec<ItemDefinition> {
    session
        .inventory
        .iter()
        .filter(|slot| slot.equipped)
        .filter_map(|slot| resolve_item(catalog, session, &slot.item_id))
        .collect()
}

pub fn derive_armor_class(character: &CharacterState, session: &SessionState, catalog: &Catalog) -> i32 {
    let equipped = equipped_items(catalog, session);
    let armor = equipped
        .iter()
        .filter_map(|item| item.armor)
        .max_by_key(|profile| profile.base_ac);
    let shield_bonus = equipped.iter().filter_map(|item| item.shield_bonus).sum();

    dnd5e::armor_class(&ArmorClassInputs {
        class_name: &character.class_name,
        dexterity_mod: character.modifier(Ability::Dexterity),
        constitution_mod: character.modifier(Ability::Constitution),
        wisdom_mod: character.modifier(Ability::Wisdom),
        armor,
        shield_bonus,
        modifier_bonus: character.modifiers.total(ModifierTarget::ArmorClass),
    })
}

/// Recompute and store AC; returns the new value when it changed.
pub fn refresh_armor_class(
    character: &mut CharacterState,
    session: &SessionState,
    catalog: &Catalog,
) -> Option<i32> {
    let derived = derive_armor_class(character, session, catalog);
    if derived == character.armor_class {
        return None;
    }
    tracing::debug!(old = character.armor_class, new = derived, "Armor class re-derived");
    character.armor_class = derived;
    Some(derived)
}

/// Install an item's passive effects under its id; returns its directive effects.
pub fn apply_item_effects(character: &mut CharacterState, item: &ItemDefinition) -> Vec<String> {
    let resolved = resolve_effects(&item.effects);
    character.modifiers.apply(item.source_id(), resolved.passive);
    resolved.directives
}

/// Remove exactly what the item contributed. Returns false if it had nothing installed.
pub fn remove_item_effects(character: &mut CharacterState, item_id: &str) -> bool {
    character.modifiers.remove(&item_source_id(item_id)).is_some()
}

/// Whether equipping `item` displaces another equipped item of the same slot.
pub fn occupies_same_slot(a: &ItemDefinition, b: &ItemDefinition) -> bool {
    match (a.category, b.category) {
        (ItemCategory::Armor, ItemCategory::Armor) => a.armor.is_some() && b.armor.is_some(),
        (ItemCategory::Shield, ItemCategory::Shield) => true,
        _ => false,
    }
}
