//! Passive modifiers with exact provenance
//!
//! Every modifier lives under the source id that contributed it (an equipped
//! item or a spell effect instance). Removing a source removes exactly what it
//! added, even when two sources grant the same bonus.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a numeric modifier adjusts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierTarget {
    ArmorClass,
    SavingThrows,
    AttackRolls,
    DamageRolls,
}

impl fmt::Display for ModifierTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArmorClass => write!(f, "AC"),
            Self::SavingThrows => write!(f, "saving throws"),
            Self::AttackRolls => write!(f, "attack rolls"),
            Self::DamageRolls => write!(f, "damage rolls"),
        }
    }
}

/// A signed bonus against a target, optionally narrowed ("+2 saving throws vs poison")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub target: ModifierTarget,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl Modifier {
    pub fn new(target: ModifierTarget, value: i32) -> Self {
        Self {
            target,
            value,
            qualifier: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollMode {
    Advantage,
    Disadvantage,
}

/// Advantage or disadvantage on a described roll ("poison saving throws")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollFlag {
    pub mode: RollMode,
    pub on: String,
}

/// Everything one source contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceModifiers {
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub roll_flags: Vec<RollFlag>,
    /// Damage types this source grants resistance to
    #[serde(default)]
    pub resistances: Vec<String>,
}

impl SourceModifiers {
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.roll_flags.is_empty() && self.resistances.is_empty()
    }
}

/// Active passive modifiers keyed by source id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveModifiers {
    by_source: BTreeMap<String, SourceModifiers>,
}

impl ActiveModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a source's contributions, replacing whatever it had before.
    pub fn apply(&mut self, source_id: impl Into<String>, contribution: SourceModifiers) {
        let source_id = source_id.into();
        if contribution.is_empty() {
            self.by_source.remove(&source_id);
        } else {
            self.by_source.insert(source_id, contribution);
        }
    }

    /// Remove a source and return what it contributed.
    pub fn remove(&mut self, source_id: &str) -> Option<SourceModifiers> {
        self.by_source.remove(source_id)
    }

    pub fn contains_source(&self, source_id: &str) -> bool {
        self.by_source.contains_key(source_id)
    }

    pub fn source(&self, source_id: &str) -> Option<&SourceModifiers> {
        self.by_source.get(source_id)
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.by_source.keys().map(String::as_str)
    }

    /// Sum of unqualified modifiers against a target.
    pub fn total(&self, target: ModifierTarget) -> i32 {
        self.by_source
            .values()
            .flat_map(|s| s.modifiers.iter())
            .filter(|m| m.target == target && m.qualifier.is_none())
            .fold(0i32, |total, m| total.saturating_add(m.value))
    }

    pub fn grants_resistance(&self, damage_type: &str) -> bool {
        self.by_source
            .values()
            .flat_map(|s| s.resistances.iter())
            .any(|r| r.eq_ignore_ascii_case(damage_type))
    }

    pub fn roll_flags(&self) -> impl Iterator<Item = &RollFlag> {
        self.by_source.values().flat_map(|s| s.roll_flags.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ac_bonus(value: i32) -> SourceModifiers {
        SourceModifiers {
            modifiers: vec![Modifier::new(ModifierTarget::ArmorClass, value)],
            ..Default::default()
        }
    }

    #[test]
    fn removing_one_source_keeps_overlapping_bonus_from_other() {
        let mut active = ActiveModifiers::new();
        active.apply("item:ring-of-protection", ac_bonus(1));
        active.apply("item:cloak-of-protection", ac_bonus(1));
        assert_eq!(active.total(ModifierTarget::ArmorClass), 2);

        let removed = active.remove("item:ring-of-protection");
        assert_eq!(removed, Some(ac_bonus(1)));
        assert_eq!(active.total(ModifierTarget::ArmorClass), 1);
        assert!(active.contains_source("item:cloak-of-protection"));
    }

    #[test]
    fn apply_replaces_previous_contribution() {
        let mut active = ActiveModifiers::new();
        active.apply("item:x", ac_bonus(1));
        active.apply("item:x", ac_bonus(3));
        assert_eq!(active.total(ModifierTarget::ArmorClass), 3);
    }

    #[test]
    fn qualified_modifiers_do_not_count_toward_total() {
        let mut active = ActiveModifiers::new();
        active.apply(
            "spell:ward",
            SourceModifiers {
                modifiers: vec![
                    Modifier::new(ModifierTarget::SavingThrows, 2).with_qualifier("poison"),
                ],
                resistances: vec!["fire".into()],
                ..Default::default()
            },
        );
        assert_eq!(active.total(ModifierTarget::SavingThrows), 0);
        assert!(active.grants_resistance("Fire"));
        assert!(!active.grants_resistance("cold"));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut active = ActiveModifiers::new();
        active.apply("item:a", ac_bonus(i32::MAX));
        active.apply("item:b", ac_bonus(5));
        assert_eq!(active.total(ModifierTarget::ArmorClass), i32::MAX);
    }

    #[test]
    fn empty_contribution_is_not_stored() {
        let mut active = ActiveModifiers::new();
        active.apply("item:rope", SourceModifiers::default());
        assert!(active.is_empty());
    }
}
