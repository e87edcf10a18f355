//! Spellcasting: slot economy, duration-tracked effects, and concentration.

use chronicler_domain::catalog::Catalog;
use chronicler_domain::directive::parse_count;
use chronicler_domain::entities::slugify;
use chronicler_domain::{
    CharacterState, Concentration, Directive, DirectiveKind, DomainError, DurationUnit,
    EffectInstanceId, SessionState, SpellDefinition, SpellEffectInstance,
};

use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, Outcome};
use crate::use_cases::effects::resolve_effects;
use crate::use_cases::equipment::refresh_armor_class;

/// Highest spell slot level.
const MAX_SPELL_LEVEL: u8 = 9;

#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    #[error("No level {level} spell slots remaining to cast {spell}")]
    NoSlots { level: u8, spell: String },
    #[error("Invalid arguments: {0}")]
    Invalid(#[from] DomainError),
}

pub struct SpellcastingHandler;

impl DirectiveHandler for SpellcastingHandler {
    fn name(&self) -> &'static str {
        "spellcasting"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        matches!(
            kind,
            DirectiveKind::Cast | DirectiveKind::ConcentrationEnd | DirectiveKind::TimePass
        )
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let result = match directive.kind {
            DirectiveKind::Cast => cast(directive, ctx),
            DirectiveKind::ConcentrationEnd => Ok(stop_concentrating(ctx)),
            DirectiveKind::TimePass => pass_time(directive, ctx),
            _ => Ok(Outcome::Ignored),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err @ SpellError::NoSlots { .. }) => ctx.refuse(err.to_string()),
            Err(err) => {
                tracing::debug!(directive = %directive.raw, error = %err, "Spell directive skipped");
                Outcome::Ignored
            }
        }
    }
}

fn cast(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, SpellError> {
    let name = directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation("Spell name is required"))?;
    let requested = directive
        .field(1)
        .map(|level| parse_count(Some(level), 0))
        .transpose()?
        .map(|level| u8::try_from(level).unwrap_or(u8::MAX));

    // Unknown spells carry no effects and cost a slot only when a level is named
    let spell = ctx.catalog.spell(name).cloned().unwrap_or_else(|| {
        SpellDefinition::new(slugify(name), name, requested.unwrap_or(0).min(MAX_SPELL_LEVEL))
    });
    let cast_level = if spell.is_cantrip() {
        0
    } else {
        requested.unwrap_or(spell.level).max(spell.level)
    };
    if cast_level > MAX_SPELL_LEVEL {
        return Err(DomainError::validation(format!("Spell level {} out of range", cast_level)).into());
    }

    if cast_level > 0 && ctx.character.spell_slots.consume(cast_level).is_err() {
        return Err(SpellError::NoSlots {
            level: cast_level,
            spell: spell.name.clone(),
        });
    }

    if spell.concentration {
        if let Some(previous) = end_concentration(ctx.session, ctx.character, ctx.catalog) {
            tracing::debug!(previous = %previous, next = %spell.name, "Concentration replaced");
        }
    }

    let resolved = resolve_effects(&spell.effects);
    for raw in resolved.directives {
        ctx.inject(raw);
    }

    let mut instance_id = None;
    match spell.duration {
        Some(duration) if duration.amount > 0 && !resolved.passive.is_empty() => {
            let instance = SpellEffectInstance {
                id: EffectInstanceId::new(),
                spell_name: spell.name.clone(),
                modifiers: resolved.passive,
                remaining: duration.amount,
                unit: duration.unit,
                concentration: spell.concentration,
            };
            ctx.character
                .modifiers
                .apply(instance.source_id(), instance.modifiers.clone());
            instance_id = Some(instance.id);
            ctx.session.effects.push(instance);
            refresh_armor_class(ctx.character, ctx.session, ctx.catalog);
        }
        _ if !resolved.passive.is_empty() => {
            tracing::debug!(spell = %spell.name, "Passive effects without a duration dropped");
        }
        _ => {}
    }

    if spell.concentration {
        ctx.session.concentration = Some(Concentration {
            spell_name: spell.name.clone(),
            instance: instance_id,
        });
    }

    tracing::info!(spell = %spell.name, level = cast_level, "Spell cast");
    ctx.info(if cast_level > spell.level {
        format!("Cast {} at level {}", spell.name, cast_level)
    } else {
        format!("Cast {}", spell.name)
    });
    Ok(Outcome::Applied)
}

fn stop_concentrating(ctx: &mut DispatchContext<'_>) -> Outcome {
    match end_concentration(ctx.session, ctx.character, ctx.catalog) {
        Some(spell) => {
            ctx.info(format!("You stop concentrating on {}", spell));
            Outcome::Applied
        }
        None => Outcome::Ignored,
    }
}

fn pass_time(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, SpellError> {
    let hours = parse_count(directive.field(0), 1)?;
    if hours == 0 {
        return Ok(Outcome::Ignored);
    }
    for spell in advance_effects(ctx.session, ctx.character, ctx.catalog, DurationUnit::Hours, hours) {
        ctx.info(format!("{} has ended", spell));
    }
    Ok(Outcome::Applied)
}

/// End the sustained spell and strip what its instance contributed.
/// Returns the spell name, or `None` when nothing was sustained.
pub fn end_concentration(
    session: &mut SessionState,
    character: &mut CharacterState,
    catalog: &Catalog,
) -> Option<String> {
    let concentration = session.concentration.take()?;
    if let Some(id) = concentration.instance {
        if let Some(index) = session.effects.iter().position(|effect| effect.id == id) {
            let instance = session.effects.remove(index);
            character.modifiers.remove(&instance.source_id());
        }
        refresh_armor_class(character, session, catalog);
    }
    tracing::info!(spell = %concentration.spell_name, "Concentration ended");
    Some(concentration.spell_name)
}

/// Count down every effect measured in `unit`; expired effects lose their
/// modifiers (and end concentration if sustained). Returns expired spell names.
pub fn advance_effects(
    session: &mut SessionState,
    character: &mut CharacterState,
    catalog: &Catalog,
    unit: DurationUnit,
    amount: u32,
) -> Vec<String> {
    let mut expired = Vec::new();
    session.effects.retain_mut(|effect| {
        if !effect.advance(unit, amount) {
            return true;
        }
        character.modifiers.remove(&effect.source_id());
        expired.push((effect.id, effect.spell_name.clone()));
        false
    });
    if expired.is_empty() {
        return Vec::new();
    }

    if session
        .concentration
        .as_ref()
        .and_then(|c| c.instance)
        .is_some_and(|id| expired.iter().any(|(expired_id, _)| *expired_id == id))
    {
        session.concentration = None;
    }
    refresh_armor_class(character, session, catalog);

    expired
        .into_iter()
        .map(|(_, spell)| {
            tracing::info!(spell = %spell, "Spell effect expired");
            spell
        })
        .collect()
}
