//! Rests and renewable class resources.

use chronicler_domain::directive::parse_count;
use chronicler_domain::{Ability, Directive, DirectiveKind, DomainError};

use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, Outcome};
use crate::use_cases::spellcasting::end_concentration;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Not enough {name}: need {needed}, have {available}")]
    Insufficient {
        name: String,
        needed: u32,
        available: u32,
    },
    #[error("Unknown resource: {0}")]
    Unknown(String),
    #[error("Invalid arguments: {0}")]
    Invalid(#[from] DomainError),
}

pub struct RestHandler;

impl DirectiveHandler for RestHandler {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        matches!(
            kind,
            DirectiveKind::ShortRest
                | DirectiveKind::LongRest
                | DirectiveKind::UseResource
                | DirectiveKind::RestoreResource
        )
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let result = match directive.kind {
            DirectiveKind::ShortRest => short_rest(directive, ctx),
            DirectiveKind::LongRest => Ok(long_rest(ctx)),
            DirectiveKind::UseResource => use_resource(directive, ctx),
            DirectiveKind::RestoreResource => restore_resource(directive, ctx),
            _ => Ok(Outcome::Ignored),
        };

        match result {
            Ok(outcome) => outcome,
            Err(err @ ResourceError::Insufficient { .. }) => ctx.refuse(err.to_string()),
            Err(err) => {
                tracing::debug!(directive = %directive.raw, error = %err, "Resource directive skipped");
                Outcome::Ignored
            }
        }
    }
}

fn short_rest(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, ResourceError> {
    let requested = parse_count(directive.field(0), 0)?;
    let con = ctx.character.modifier(Ability::Constitution);
    let die_size = i32::from(ctx.character.hit_dice.die_size);

    let mut spent = 0;
    let mut regained = 0;
    while spent < requested
        && ctx.character.hit_dice.current > 0
        && ctx.character.hp < ctx.character.max_hp
    {
        ctx.character.hit_dice.current -= 1;
        spent += 1;
        let roll = ctx.random.gen_range(1, die_size);
        regained += ctx.character.heal((roll + con).max(0));
    }

    for resource in ctx.character.resources.iter_mut() {
        if resource.recovery.on_short_rest() {
            resource.refill();
        }
    }

    tracing::info!(spent, regained, "Short rest");
    ctx.info(if spent > 0 {
        format!(
            "Short rest: spent {} hit dice and regained {} hit points",
            spent, regained
        )
    } else {
        "Short rest taken".to_string()
    });
    Ok(Outcome::Applied)
}

fn long_rest(ctx: &mut DispatchContext<'_>) -> Outcome {
    let character = &mut *ctx.character;
    character.hp = character.max_hp;
    character.temp_hp = 0;
    character.spell_slots.restore_all();
    character.hit_dice.recover_half();
    for resource in character.resources.iter_mut() {
        resource.refill();
    }
    end_concentration(ctx.session, ctx.character, ctx.catalog);

    tracing::info!(hp = ctx.character.hp, "Long rest");
    ctx.info("Long rest: hit points, spell slots, and resources restored");
    Outcome::Applied
}

fn resource_args(directive: &Directive) -> Result<(&str, u32), ResourceError> {
    let name = directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation("Resource name is required"))?;
    let amount = parse_count(directive.field(1), 1)?;
    Ok((name, amount))
}

fn use_resource(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, ResourceError> {
    let (name, amount) = resource_args(directive)?;
    let resource = ctx
        .character
        .find_resource_mut(name)
        .ok_or_else(|| ResourceError::Unknown(name.to_string()))?;

    if resource.spend(amount).is_err() {
        return Err(ResourceError::Insufficient {
            name: resource.name.clone(),
            needed: amount,
            available: resource.current,
        });
    }
    tracing::debug!(resource = %resource.name, remaining = resource.current, "Resource spent");
    Ok(Outcome::Applied)
}

fn restore_resource(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, ResourceError> {
    let (name, amount) = resource_args(directive)?;
    let resource = ctx
        .character
        .find_resource_mut(name)
        .ok_or_else(|| ResourceError::Unknown(name.to_string()))?;

    if resource.restore(amount) == 0 {
        return Ok(Outcome::Ignored);
    }
    Ok(Outcome::Applied)
}
