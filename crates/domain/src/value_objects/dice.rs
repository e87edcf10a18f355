//! Dice formulas used by directive amounts, rolls, and rests
//!
//! Accepts "XdY", "XdY+Z", "XdY-Z" and the "dY" shorthand. Randomness is
//! supplied by the caller as a `(min, max) -> value` closure so the domain
//! never owns an RNG.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest dice count accepted from generated text.
const MAX_DICE: u16 = 100;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    #[error("Empty dice formula")]
    Empty,
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    #[error("Dice count must be between 1 and 100")]
    InvalidDiceCount,
    #[error("Die size must be at least 2")]
    InvalidDieSize,
}

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    pub dice_count: u16,
    pub die_size: u16,
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(dice_count: u16, die_size: u16, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 || dice_count > MAX_DICE {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Parse a dice formula string like "1d20+5", "2d6-1", "d8".
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if compact.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let (count_str, rest) = compact.split_once('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", compact))
        })?;

        let dice_count = if count_str.is_empty() {
            1
        } else {
            count_str.parse::<u16>().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", count_str))
            })?
        };

        let (size_str, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
            Some(0) => {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Invalid die size: '{}'",
                    rest
                )))
            }
            Some(pos) => {
                let (size, signed) = rest.split_at(pos);
                let value = signed.parse::<i32>().map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid modifier: '{}'", signed))
                })?;
                (size, value)
            }
            None => (rest, 0),
        };

        let die_size = size_str.parse::<u16>().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", size_str))
        })?;

        Self::new(dice_count, die_size, modifier)
    }

    /// Roll with a caller-supplied inclusive range generator.
    pub fn roll_with(&self, roll: &mut dyn FnMut(i32, i32) -> i32) -> DiceRollResult {
        let individual_rolls: Vec<i32> = (0..self.dice_count)
            .map(|_| roll(1, i32::from(self.die_size)))
            .collect();
        let dice_total = individual_rolls
            .iter()
            .fold(0i32, |total, roll| total.saturating_add(*roll));

        DiceRollResult {
            formula: *self,
            individual_rolls,
            dice_total,
            total: dice_total.saturating_add(self.modifier),
        }
    }

    /// Average result rounded down, as used for fixed hit point gains.
    pub fn average(&self) -> i32 {
        let per_die = (i32::from(self.die_size) + 1) as f64 / 2.0;
        ((per_die * f64::from(self.dice_count)).floor() as i32).saturating_add(self.modifier)
    }

    pub fn min_roll(&self) -> i32 {
        i32::from(self.dice_count).saturating_add(self.modifier)
    }

    pub fn max_roll(&self) -> i32 {
        (i32::from(self.dice_count) * i32::from(self.die_size)).saturating_add(self.modifier)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.dice_count, self.die_size)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

/// Result of rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    pub formula: DiceFormula,
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    pub total: i32,
}

impl DiceRollResult {
    /// Format as a breakdown string (e.g., "2d6[3, 5] + 2 = 10")
    pub fn breakdown(&self) -> String {
        let rolls = self
            .individual_rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let dice = format!("{}d{}", self.formula.dice_count, self.formula.die_size);
        match self.formula.modifier {
            0 => format!("{}[{}] = {}", dice, rolls, self.total),
            m if m > 0 => format!("{}[{}] + {} = {}", dice, rolls, m, self.total),
            m => format!("{}[{}] - {} = {}", dice, rolls, m.unsigned_abs(), self.total),
        }
    }

    pub fn is_natural_20(&self) -> bool {
        self.formula.die_size == 20
            && self.formula.dice_count == 1
            && self.individual_rolls.first() == Some(&20)
    }
}
