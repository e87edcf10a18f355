//! Chronicler domain: the directive grammar, play state, and rules arithmetic.
//!
//! Everything here is synchronous and free of I/O. Randomness enters through
//! caller-supplied closures.

pub mod catalog;
pub mod directive;
pub mod entities;
pub mod error;
pub mod game_systems;
pub mod ids;
pub mod value_objects;

pub use catalog::{Catalog, CreatureTemplate};
pub use directive::{
    parse_directives, Amount, DedupRegistry, Directive, DirectiveKey, DirectiveKind, ParseMode,
    ParsedText, Position,
};
pub use entities::{
    Ability, AbilityScores, ArmorProfile, ArmorWeight, CharacterState, ClassResource, Combatant,
    Concentration, Condition, DurationUnit, Encounter, HitDice, InventorySlot, ItemCategory,
    ItemDefinition, PendingItemRequest, QuestEntry, Recovery, SessionState, SpellDefinition,
    SpellDuration, SpellEffectInstance, SpellSlotPool, SpellSlots, XpEntry,
};
pub use error::DomainError;
pub use ids::{CharacterId, CombatantId, EffectInstanceId, SessionId};
pub use value_objects::{
    ActiveModifiers, DefenseCategory, Defenses, DiceFormula, DiceParseError, DiceRollResult,
    Modifier, ModifierTarget, RollFlag, RollMode, SourceModifiers, Susceptibility,
};
