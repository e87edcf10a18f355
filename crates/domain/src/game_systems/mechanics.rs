//! Damage, temporary hit points, and concentration checks
//!
//! Pure functions. Callers decide which hit point pool the results land in.

use crate::entities::{Ability, CharacterState};
use crate::value_objects::Susceptibility;

/// Result of running raw damage through defenses and temporary hit points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Damage after immunity, resistance, and vulnerability
    pub actual_damage: i32,
    pub temp_hp_consumed: i32,
    /// What is left for real hit points after temp hp absorbs its share
    pub hp_lost: i32,
}

/// Immunity zeroes, resistance halves (rounding down), vulnerability doubles.
/// Resistance and vulnerability to the same type cancel out.
pub fn apply_damage(amount: i32, susceptibility: Susceptibility, temp_hp: i32) -> DamageOutcome {
    let amount = amount.max(0);
    let actual_damage = if susceptibility.immune {
        0
    } else {
        match (susceptibility.resistant, susceptibility.vulnerable) {
            (true, false) => amount / 2,
            (false, true) => amount.saturating_mul(2),
            _ => amount,
        }
    };

    let temp_hp_consumed = actual_damage.min(temp_hp.max(0));
    DamageOutcome {
        actual_damage,
        temp_hp_consumed,
        hp_lost: actual_damage - temp_hp_consumed,
    }
}

/// Temporary hit points never stack: keep the new amount.
pub fn apply_temp_hp(_current: i32, amount: i32) -> i32 {
    amount.max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcentrationCheck {
    pub dc: i32,
    pub total: i32,
    pub broken: bool,
}

/// Constitution save against DC max(10, damage / 2) using a d20 already rolled.
pub fn check_concentration(character: &CharacterState, damage: i32, d20: i32) -> ConcentrationCheck {
    let dc = (damage / 2).max(10);
    let mut bonus = character.modifier(Ability::Constitution);
    if character.is_proficient_in_save(Ability::Constitution) {
        bonus += character.proficiency_bonus();
    }
    let total = d20 + bonus;
    ConcentrationCheck {
        dc,
        total,
        broken: total < dc,
    }
}
