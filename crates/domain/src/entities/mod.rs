//! Domain entities

mod character;
mod encounter;
mod item;
mod resources;
mod session;
mod spell;

pub use character::{Ability, AbilityScores, CharacterState, XpEntry};
pub use encounter::{Combatant, Encounter, DEFEATED};
pub use item::{
    item_source_id, slugify, ArmorProfile, ArmorWeight, ItemCategory, ItemDefinition,
};
pub use resources::{ClassResource, HitDice, Recovery, SpellSlotPool, SpellSlots};
pub use session::{
    Concentration, Condition, InventorySlot, PendingItemRequest, QuestEntry, SessionState,
};
pub use spell::{
    effect_source_id, DurationUnit, SpellDefinition, SpellDuration, SpellEffectInstance,
};
