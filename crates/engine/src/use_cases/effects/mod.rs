//! Effect resolution.
//!
//! Turns the free-text effects attached to items and spells into something
//! the engine can act on: a directive to re-inject, a passive modifier, an
//! advantage flag, or a granted resistance. Only the resolved shape is kept.

use std::sync::LazyLock;

use chronicler_domain::directive::{parse_directives, ParseMode};
use chronicler_domain::{Modifier, ModifierTarget, RollFlag, RollMode, SourceModifiers};
use regex_lite::Regex;

static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([+-]\d+)\s*(?:bonus\s+)?(?:to\s+|on\s+)?(ac|armor class|saving throws?|saves?|attack rolls?|attacks?|to-hit|to hit|damage rolls?|damage)(?:\s+(?:against|vs\.?|versus)\s+([a-z ]+?))?\s*$",
    )
    .expect("valid regex")
});
static ROLL_FLAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(advantage|disadvantage)\s+on\s+(.+?)\s*$").expect("valid regex")
});
static RESISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:grants?\s+)?resistance\s+to\s+([a-z]+)(?:\s+damage)?\s*$")
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedEffect {
    /// A directive to fold back into the current pass
    Directive(String),
    Modifier(Modifier),
    RollFlag(RollFlag),
    Resistance(String),
    Unrecognized(String),
}

/// Effects of one source, grouped by how they are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEffects {
    pub directives: Vec<String>,
    pub passive: SourceModifiers,
    pub unrecognized: Vec<String>,
}

fn modifier_target(label: &str) -> Option<ModifierTarget> {
    let label = label.to_lowercase();
    match label.as_str() {
        "ac" | "armor class" => Some(ModifierTarget::ArmorClass),
        l if l.starts_with("sav") => Some(ModifierTarget::SavingThrows),
        l if l.starts_with("attack") || l.starts_with("to") => Some(ModifierTarget::AttackRolls),
        l if l.starts_with("damage") => Some(ModifierTarget::DamageRolls),
        _ => None,
    }
}

pub fn resolve_effect(text: &str) -> ResolvedEffect {
    let trimmed = text.trim();

    let parsed = parse_directives(trimmed, ParseMode::Final);
    if parsed.directives.len() == 1 && parsed.display_text.is_empty() {
        return ResolvedEffect::Directive(parsed.directives[0].raw.clone());
    }

    if let Some(caps) = MODIFIER_RE.captures(trimmed) {
        let value = caps.get(1).and_then(|m| m.as_str().trim_start_matches('+').parse::<i32>().ok());
        let target = caps.get(2).and_then(|m| modifier_target(m.as_str()));
        if let (Some(value), Some(target)) = (value, target) {
            let modifier = Modifier::new(target, value);
            return ResolvedEffect::Modifier(match caps.get(3) {
                Some(qualifier) => modifier.with_qualifier(qualifier.as_str().trim().to_lowercase()),
                None => modifier,
            });
        }
    }

    if let Some(caps) = ROLL_FLAG_RE.captures(trimmed) {
        let mode = if caps
            .get(1)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("advantage"))
        {
            RollMode::Advantage
        } else {
            RollMode::Disadvantage
        };
        let on = caps.get(2).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        return ResolvedEffect::RollFlag(RollFlag { mode, on });
    }

    if let Some(caps) = RESISTANCE_RE.captures(trimmed) {
        if let Some(damage_type) = caps.get(1) {
            return ResolvedEffect::Resistance(damage_type.as_str().to_lowercase());
        }
    }

    ResolvedEffect::Unrecognized(trimmed.to_string())
}

pub fn resolve_effects(effects: &[String]) -> ResolvedEffects {
    let mut resolved = ResolvedEffects::default();
    for effect in effects {
        match resolve_effect(effect) {
            ResolvedEffect::Directive(raw) => resolved.directives.push(raw),
            ResolvedEffect::Modifier(modifier) => resolved.passive.modifiers.push(modifier),
            ResolvedEffect::RollFlag(flag) => resolved.passive.roll_flags.push(flag),
            ResolvedEffect::Resistance(damage_type) => {
                resolved.passive.resistances.push(damage_type)
            }
            ResolvedEffect::Unrecognized(text) => {
                tracing::debug!(effect = %text, "Effect text not recognized");
                resolved.unrecognized.push(text)
            }
        }
    }
    resolved
}
