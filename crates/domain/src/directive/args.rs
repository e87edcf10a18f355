//! Typed directive arguments
//!
//! Every handler reads amounts through `Amount` so "7" and "2d6+1" are
//! handled the same way everywhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{DiceFormula, DiceRollResult};

/// A literal number or a dice expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Amount {
    Literal(i32),
    Dice(DiceFormula),
}

/// A resolved amount with its roll breakdown, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAmount {
    pub value: i32,
    pub roll: Option<DiceRollResult>,
}

impl Amount {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::parse("Empty amount"));
        }
        if let Ok(value) = trimmed.trim_start_matches('+').parse::<i32>() {
            return Ok(Self::Literal(value));
        }
        Ok(Self::Dice(DiceFormula::parse(trimmed)?))
    }

    pub fn resolve(&self, roll: &mut dyn FnMut(i32, i32) -> i32) -> ResolvedAmount {
        match self {
            Self::Literal(value) => ResolvedAmount {
                value: *value,
                roll: None,
            },
            Self::Dice(formula) => {
                let result = formula.roll_with(roll);
                ResolvedAmount {
                    value: result.total,
                    roll: Some(result),
                }
            }
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", value),
            Self::Dice(formula) => write!(f, "{}", formula),
        }
    }
}

/// Parse an optional count field; blank means `default`.
pub fn parse_count(field: Option<&str>, default: u32) -> Result<u32, DomainError> {
    match field {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .trim_start_matches('+')
            .parse::<u32>()
            .map_err(|_| DomainError::parse(format!("Invalid count: '{}'", raw))),
    }
}

/// Parse a signed decimal such as "-12.5" or "+3".
pub fn parse_decimal(field: &str) -> Result<f64, DomainError> {
    let value = field
        .trim()
        .trim_start_matches('+')
        .parse::<f64>()
        .map_err(|_| DomainError::parse(format!("Invalid number: '{}'", field)))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::parse(format!("Invalid number: '{}'", field)))
    }
}

/// Parse a signed integer such as "-2" or "+5".
pub fn parse_signed(field: &str) -> Result<i32, DomainError> {
    field
        .trim()
        .trim_start_matches('+')
        .parse::<i32>()
        .map_err(|_| DomainError::parse(format!("Invalid integer: '{}'", field)))
}

/// Round a currency amount to two decimal places.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_distinguishes_literals_from_dice() {
        assert_eq!(Amount::parse("7").unwrap(), Amount::Literal(7));
        assert_eq!(Amount::parse("+3").unwrap(), Amount::Literal(3));
        assert!(matches!(Amount::parse("2d6+1").unwrap(), Amount::Dice(_)));
        assert!(Amount::parse("lots").is_err());
        assert!(Amount::parse("").is_err());
    }

    #[test]
    fn dice_amount_resolves_through_generator() {
        let amount = Amount::parse("2d4+2").unwrap();
        let resolved = amount.resolve(&mut |_, max| max);
        assert_eq!(resolved.value, 10);
        assert!(resolved.roll.is_some());

        let resolved = Amount::Literal(5).resolve(&mut |_, _| panic!("no roll for literals"));
        assert_eq!(resolved.value, 5);
        assert!(resolved.roll.is_none());
    }

    #[test]
    fn numeric_helpers_accept_signs() {
        assert_eq!(parse_count(None, 1).unwrap(), 1);
        assert_eq!(parse_count(Some("3"), 1).unwrap(), 3);
        assert!(parse_count(Some("-1"), 1).is_err());
        assert_eq!(parse_decimal("-12.5").unwrap(), -12.5);
        assert_eq!(parse_signed("+4").unwrap(), 4);
        assert_eq!(round_currency(10.005_1), 10.01);
    }
}
