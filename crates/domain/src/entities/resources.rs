//! Renewable pools: spell slots, class resources, and hit dice

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Slots available at one spell level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellSlotPool {
    current: u8,
    max: u8,
}

impl SpellSlotPool {
    pub fn new(max: u8) -> Self {
        Self { current: max, max }
    }

    pub fn with_current(current: u8, max: u8) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn has_slots(&self) -> bool {
        self.current > 0
    }

    pub fn restore_all(&mut self) {
        self.current = self.max;
    }

    /// Change the maximum; current keeps its spent count.
    pub fn set_max(&mut self, max: u8) {
        let spent = self.max.saturating_sub(self.current);
        self.max = max;
        self.current = max.saturating_sub(spent);
    }
}

/// Spell slots keyed by spell level (1-9)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellSlots {
    by_level: BTreeMap<u8, SpellSlotPool>,
}

impl SpellSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from maxima, index 0 being level 1.
    pub fn from_maxima(maxima: &[u8]) -> Self {
        let by_level = maxima
            .iter()
            .enumerate()
            .filter(|(_, max)| **max > 0)
            .map(|(index, max)| (index as u8 + 1, SpellSlotPool::new(*max)))
            .collect();
        Self { by_level }
    }

    pub fn get(&self, level: u8) -> Option<&SpellSlotPool> {
        self.by_level.get(&level)
    }

    pub fn set(&mut self, level: u8, pool: SpellSlotPool) {
        self.by_level.insert(level, pool);
    }

    /// Spend one slot at `level`, refusing when none remain.
    pub fn consume(&mut self, level: u8) -> Result<(), DomainError> {
        let available = self.get(level).map(|p| p.current).unwrap_or(0);
        match self.by_level.get_mut(&level) {
            Some(pool) if pool.current > 0 => {
                pool.current -= 1;
                Ok(())
            }
            _ => Err(DomainError::insufficient(
                format!("level {} spell slots", level),
                1,
                i64::from(available),
            )),
        }
    }

    pub fn restore_all(&mut self) {
        self.by_level.values_mut().for_each(SpellSlotPool::restore_all);
    }

    /// Raise maxima to match a table row, keeping spent slots spent.
    pub fn apply_maxima(&mut self, maxima: &[u8]) {
        for (index, max) in maxima.iter().enumerate() {
            if *max == 0 {
                continue;
            }
            let level = index as u8 + 1;
            self.by_level
                .entry(level)
                .and_modify(|pool| pool.set_max(*max))
                .or_insert_with(|| SpellSlotPool::new(*max));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &SpellSlotPool)> {
        self.by_level.iter().map(|(level, pool)| (*level, pool))
    }
}

/// When a class resource refills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recovery {
    ShortRest,
    LongRest,
    /// Either kind of rest
    Either,
}

impl Recovery {
    pub fn on_short_rest(&self) -> bool {
        matches!(self, Self::ShortRest | Self::Either)
    }
}

/// A class ability with charges (Rage, Channel Divinity, Ki)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResource {
    pub name: String,
    pub current: u32,
    pub max: u32,
    pub recovery: Recovery,
}

impl ClassResource {
    pub fn new(name: impl Into<String>, max: u32, recovery: Recovery) -> Self {
        Self {
            name: name.into(),
            current: max,
            max,
            recovery,
        }
    }

    pub fn spend(&mut self, amount: u32) -> Result<(), DomainError> {
        if amount > self.current {
            return Err(DomainError::insufficient(
                self.name.clone(),
                i64::from(amount),
                i64::from(self.current),
            ));
        }
        self.current -= amount;
        Ok(())
    }

    /// Restore up to `amount` charges; returns how many were restored.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

/// Hit dice spent during short rests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitDice {
    pub current: u32,
    pub max: u32,
    pub die_size: u16,
}

impl HitDice {
    pub fn new(max: u32, die_size: u16) -> Self {
        Self {
            current: max,
            max,
            die_size,
        }
    }

    /// Long-rest recovery: half the maximum, rounded down, at least one.
    pub fn recover_half(&mut self) -> u32 {
        let regained = (self.max / 2).max(1);
        let before = self.current;
        self.current = (self.current + regained).min(self.max);
        self.current - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_refuses_empty_level_and_leaves_pool_untouched() {
        let mut slots = SpellSlots::from_maxima(&[2, 0, 1]);
        assert!(slots.get(2).is_none());

        slots.consume(1).unwrap();
        slots.consume(1).unwrap();
        let before = slots.clone();
        let err = slots.consume(1).unwrap_err();

        assert!(matches!(err, DomainError::Insufficient { available: 0, .. }));
        assert_eq!(slots, before);
        assert!(slots.consume(2).is_err());
    }

    #[test]
    fn apply_maxima_keeps_spent_slots_spent() {
        let mut slots = SpellSlots::from_maxima(&[2]);
        slots.consume(1).unwrap();
        slots.apply_maxima(&[3, 2]);

        assert_eq!(slots.get(1).map(|p| (p.current(), p.max())), Some((2, 3)));
        assert_eq!(slots.get(2).map(|p| (p.current(), p.max())), Some((2, 2)));
    }

    #[test]
    fn class_resource_spend_and_restore_clamp() {
        let mut rage = ClassResource::new("Rage", 3, Recovery::LongRest);
        assert!(rage.spend(4).is_err());
        rage.spend(2).unwrap();
        assert_eq!(rage.restore(5), 2);
        assert_eq!(rage.current, 3);
    }

    #[test]
    fn hit_dice_recover_half_with_minimum_one() {
        let mut dice = HitDice::new(1, 10);
        dice.current = 0;
        assert_eq!(dice.recover_half(), 1);

        let mut dice = HitDice::new(5, 8);
        dice.current = 0;
        assert_eq!(dice.recover_half(), 2);
        dice.current = 4;
        assert_eq!(dice.recover_half(), 1);
        assert_eq!(dice.current, 5);
    }
}
