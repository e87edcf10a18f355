//! Value objects shared by entities and directive handlers

mod defenses;
mod dice;
mod modifier;

pub use defenses::{DefenseCategory, Defenses, Susceptibility};
pub use dice::{DiceFormula, DiceParseError, DiceRollResult};
pub use modifier::{
    ActiveModifiers, Modifier, ModifierTarget, RollFlag, RollMode, SourceModifiers,
};
