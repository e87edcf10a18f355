//! Spells and the duration-tracked effects they leave behind

use serde::{Deserialize, Serialize};

use crate::ids::EffectInstanceId;
use crate::value_objects::SourceModifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationUnit {
    Rounds,
    Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl SpellDuration {
    pub fn rounds(amount: u32) -> Self {
        Self {
            amount,
            unit: DurationUnit::Rounds,
        }
    }

    pub fn hours(amount: u32) -> Self {
        Self {
            amount,
            unit: DurationUnit::Hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellDefinition {
    pub id: String,
    pub name: String,
    /// 0 for cantrips
    pub level: u8,
    #[serde(default)]
    pub concentration: bool,
    /// `None` for instantaneous spells
    #[serde(default)]
    pub duration: Option<SpellDuration>,
    #[serde(default)]
    pub effects: Vec<String>,
}

impl SpellDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            concentration: false,
            duration: None,
            effects: Vec::new(),
        }
    }

    pub fn concentration(mut self) -> Self {
        self.concentration = true;
        self
    }

    pub fn lasting(mut self, duration: SpellDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.push(effect.into());
        self
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.id.eq_ignore_ascii_case(query) || self.name.eq_ignore_ascii_case(query)
    }
}

/// An applied spell still counting down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellEffectInstance {
    pub id: EffectInstanceId,
    pub spell_name: String,
    pub modifiers: SourceModifiers,
    pub remaining: u32,
    pub unit: DurationUnit,
    #[serde(default)]
    pub concentration: bool,
}

impl SpellEffectInstance {
    pub fn source_id(&self) -> String {
        effect_source_id(self.id)
    }

    /// Count down in `unit`; other units are untouched. Returns true once expired.
    pub fn advance(&mut self, unit: DurationUnit, amount: u32) -> bool {
        if unit == self.unit {
            self.remaining = self.remaining.saturating_sub(amount);
        }
        self.remaining == 0
    }
}

pub fn effect_source_id(id: EffectInstanceId) -> String {
    format!("spell:{}", id)
}
