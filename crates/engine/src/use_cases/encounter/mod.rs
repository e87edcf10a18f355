//! Encounter lifecycle for the terminal pass.
//!
//! Creature templates come from an async world lookup. Lookups for every
//! unsettled COMBAT_START are resolved up front so the pass itself stays
//! synchronous.

use std::collections::HashMap;

use chronicler_domain::game_systems::dnd5e::ability_modifier;
use chronicler_domain::{
    Ability, Combatant, CombatantId, CreatureTemplate, DedupRegistry, Directive, DirectiveKey,
    DirectiveKind, Encounter,
};

use crate::infrastructure::ports::WorldLookupPort;
use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, Outcome};

/// Creature rosters for COMBAT_START directives, keyed by occurrence.
#[derive(Debug, Clone, Default)]
pub struct PreparedEncounters {
    rosters: HashMap<DirectiveKey, Vec<CreatureTemplate>>,
}

impl PreparedEncounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self, key: &DirectiveKey) -> Option<&[CreatureTemplate]> {
        self.rosters.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }
}

fn creature_names(payload: &str) -> impl Iterator<Item = &str> {
    payload.split(',').map(str::trim).filter(|name| !name.is_empty())
}

/// Resolve creature templates for every COMBAT_START not yet settled.
/// Lookup failures and unknown names fall back to a generic template.
pub async fn prepare_encounters(
    directives: &[Directive],
    registry: &DedupRegistry,
    world: &dyn WorldLookupPort,
) -> PreparedEncounters {
    let mut prepared = PreparedEncounters::new();
    for directive in directives
        .iter()
        .filter(|d| d.kind == DirectiveKind::CombatStart)
        .filter(|d| !registry.contains(&d.key()))
    {
        let mut roster = Vec::new();
        for name in creature_names(&directive.payload) {
            let template = match world.find_creature(name).await {
                Ok(Some(template)) => template,
                Ok(None) => {
                    tracing::debug!(creature = %name, "Unknown creature, using generic template");
                    CreatureTemplate::generic(name)
                }
                Err(e) => {
                    tracing::warn!(creature = %name, error = %e, "Creature lookup failed, using generic template");
                    CreatureTemplate::generic(name)
                }
            };
            roster.push(template);
        }
        prepared.rosters.insert(directive.key(), roster);
    }
    prepared
}

/// Give repeated names a running number: "Goblin", "Goblin 2", "Goblin 3".
fn numbered_names(roster: &[CreatureTemplate]) -> Vec<String> {
    let mut seen: HashMap<&str, u32> = HashMap::new();
    roster
        .iter()
        .map(|template| {
            let count = seen.entry(template.name.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                template.name.clone()
            } else {
                format!("{} {}", template.name, count)
            }
        })
        .collect()
}

pub struct EncounterHandler {
    prepared: PreparedEncounters,
}

impl EncounterHandler {
    pub fn new(prepared: PreparedEncounters) -> Self {
        Self { prepared }
    }

    fn start(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let roster: Vec<CreatureTemplate> = match self.prepared.roster(&directive.key()) {
            Some(roster) => roster.to_vec(),
            None => creature_names(&directive.payload)
                .map(CreatureTemplate::generic)
                .collect(),
        };
        if roster.is_empty() {
            return Outcome::Ignored;
        }

        let mut combatants: Vec<Combatant> = roster
            .iter()
            .zip(numbered_names(&roster))
            .map(|(template, name)| Combatant {
                id: CombatantId::new(),
                name,
                hp: template.max_hp,
                max_hp: template.max_hp,
                armor_class: template.armor_class,
                temp_hp: 0,
                initiative: ctx.d20() + ability_modifier(template.dexterity),
                is_player: false,
                defenses: template.defenses.clone(),
                conditions: Vec::new(),
            })
            .collect();

        let character = &*ctx.character;
        combatants.push(Combatant {
            id: CombatantId::new(),
            name: character.name.clone(),
            hp: character.hp,
            max_hp: character.max_hp,
            armor_class: character.armor_class,
            temp_hp: character.temp_hp,
            initiative: ctx.d20() + character.modifier(Ability::Dexterity),
            is_player: true,
            defenses: character.defenses.clone(),
            conditions: Vec::new(),
        });

        let encounter = Encounter::new(combatants);
        let order = encounter
            .combatants
            .iter()
            .map(|c| format!("{} ({})", c.name, c.initiative))
            .collect::<Vec<_>>()
            .join(", ");
        if ctx.session.encounter.is_some() {
            tracing::debug!("Replacing running encounter");
        }
        tracing::info!(combatants = encounter.combatants.len(), "Combat started");
        ctx.session.encounter = Some(encounter);
        ctx.info(format!("Combat begins! Initiative: {}", order));
        Outcome::Applied
    }
}

impl DirectiveHandler for EncounterHandler {
    fn name(&self) -> &'static str {
        "encounter"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        kind.is_terminal_only()
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        match directive.kind {
            DirectiveKind::CombatStart => self.start(directive, ctx),
            DirectiveKind::CombatEnd => match ctx.session.encounter.take() {
                Some(encounter) => {
                    tracing::info!(rounds = encounter.round, "Combat ended");
                    ctx.info("Combat ends");
                    Outcome::Applied
                }
                None => Outcome::Ignored,
            },
            _ => Outcome::Ignored,
        }
    }
}
