//! Combat: damage, healing, temporary hit points, defenses, and turn order.
//!
//! The character record is the persistent copy of the player's hit points;
//! the player's combatant entry mirrors it while an encounter is running.

use chronicler_domain::game_systems::mechanics::{apply_damage, apply_temp_hp, check_concentration};
use chronicler_domain::{
    Amount, DefenseCategory, Directive, DirectiveKind, DomainError, DurationUnit,
};

use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, NotificationKind, Outcome};
use crate::use_cases::spellcasting::{advance_effects, end_concentration};

#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("{0} only applies to the player")]
    PlayerOnly(DirectiveKind),
    #[error("Invalid arguments: {0}")]
    Invalid(#[from] DomainError),
}

enum Target {
    Player,
    Combatant(usize),
}

pub struct CombatHandler;

impl DirectiveHandler for CombatHandler {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        matches!(
            kind,
            DirectiveKind::Damage
                | DirectiveKind::Heal
                | DirectiveKind::TempHp
                | DirectiveKind::ResistanceAdd
                | DirectiveKind::ResistanceRemove
                | DirectiveKind::ImmunityAdd
                | DirectiveKind::ImmunityRemove
                | DirectiveKind::VulnerabilityAdd
                | DirectiveKind::VulnerabilityRemove
                | DirectiveKind::NextTurn
        )
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let result = match directive.kind {
            DirectiveKind::Damage => damage(directive, ctx),
            DirectiveKind::Heal => heal(directive, ctx),
            DirectiveKind::TempHp => temp_hp(directive, ctx),
            DirectiveKind::ResistanceAdd => toggle_defense(directive, ctx, DefenseCategory::Resistance, true),
            DirectiveKind::ResistanceRemove => toggle_defense(directive, ctx, DefenseCategory::Resistance, false),
            DirectiveKind::ImmunityAdd => toggle_defense(directive, ctx, DefenseCategory::Immunity, true),
            DirectiveKind::ImmunityRemove => toggle_defense(directive, ctx, DefenseCategory::Immunity, false),
            DirectiveKind::VulnerabilityAdd => {
                toggle_defense(directive, ctx, DefenseCategory::Vulnerability, true)
            }
            DirectiveKind::VulnerabilityRemove => {
                toggle_defense(directive, ctx, DefenseCategory::Vulnerability, false)
            }
            DirectiveKind::NextTurn => Ok(next_turn(ctx)),
            _ => Ok(Outcome::Ignored),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(directive = %directive.raw, error = %err, "Combat directive skipped");
            Outcome::Ignored
        })
    }
}

fn resolve_target(ctx: &DispatchContext<'_>, query: &str) -> Option<Target> {
    let query = query.trim();
    if query.eq_ignore_ascii_case("player")
        || query.eq_ignore_ascii_case("you")
        || query.eq_ignore_ascii_case(&ctx.character.name)
    {
        return Some(Target::Player);
    }
    ctx.session
        .encounter
        .as_ref()
        .and_then(|encounter| encounter.find_index(query))
        .map(Target::Combatant)
}

fn parse_amount(directive: &Directive, index: usize) -> Result<Amount, CombatError> {
    let raw = directive
        .field(index)
        .ok_or_else(|| DomainError::validation("Amount is required"))?;
    Ok(Amount::parse(raw)?)
}

/// Copy the character's hit points and defenses onto its combatant entry.
fn sync_player_combatant(ctx: &mut DispatchContext<'_>) {
    let character = &*ctx.character;
    if let Some(player) = ctx.session.encounter.as_mut().and_then(|e| e.player_mut()) {
        player.hp = character.hp;
        player.max_hp = character.max_hp;
        player.temp_hp = character.temp_hp;
        player.armor_class = character.armor_class;
        player.defenses = character.defenses.clone();
    }
}

fn damage(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, CombatError> {
    let query = directive.field(0).unwrap_or("player");
    let amount = parse_amount(directive, 1)?;
    let damage_type = directive
        .field(2)
        .map(|t| t.trim().to_lowercase())
        .unwrap_or_default();

    let Some(target) = resolve_target(ctx, query) else {
        tracing::debug!(target = %query, "Damage target not present yet");
        return Ok(Outcome::Deferred);
    };
    if matches!(target, Target::Combatant(_)) && ctx.encounter_change_pending() {
        tracing::debug!(target = %query, "Encounter about to change, damage waits");
        return Ok(Outcome::Deferred);
    }

    let mut roll = ctx.roller();
    let rolled = amount.resolve(&mut roll);
    let typed = if damage_type.is_empty() {
        String::new()
    } else {
        format!(" {}", damage_type)
    };

    match target {
        Target::Player => {
            let outcome = apply_damage(
                rolled.value,
                ctx.character.susceptibility(&damage_type),
                ctx.character.temp_hp,
            );
            ctx.character.temp_hp -= outcome.temp_hp_consumed;
            ctx.character.lose_hp(outcome.hp_lost);
            sync_player_combatant(ctx);
            tracing::info!(
                damage = outcome.actual_damage,
                damage_type = %damage_type,
                hp = ctx.character.hp,
                "Player damaged"
            );
            ctx.info(format!(
                "{} takes {}{} damage",
                ctx.character.name, outcome.actual_damage, typed
            ));

            // Damage soaked by temporary hit points still counts as taken
            if outcome.actual_damage > 0 && ctx.session.concentration.is_some() {
                let check = check_concentration(ctx.character, outcome.actual_damage, ctx.d20());
                if check.broken {
                    if let Some(spell) = end_concentration(ctx.session, ctx.character, ctx.catalog) {
                        sync_player_combatant(ctx);
                        ctx.notify(
                            NotificationKind::ConcentrationBroken,
                            format!(
                                "Concentration on {} broken ({} vs DC {})",
                                spell, check.total, check.dc
                            ),
                        );
                    }
                }
            }
        }
        Target::Combatant(index) => {
            let Some(encounter) = ctx.session.encounter.as_mut() else {
                return Ok(Outcome::Deferred);
            };
            let combatant = &mut encounter.combatants[index];
            let was_defeated = combatant.is_defeated();
            let outcome = apply_damage(
                rolled.value,
                combatant.defenses.susceptibility(&damage_type),
                combatant.temp_hp,
            );
            combatant.temp_hp -= outcome.temp_hp_consumed;
            combatant.lose_hp(outcome.hp_lost);
            let name = combatant.name.clone();
            let defeated = !was_defeated && combatant.is_defeated();

            tracing::info!(target = %name, damage = outcome.actual_damage, "Combatant damaged");
            ctx.info(format!("{} takes {}{} damage", name, outcome.actual_damage, typed));
            if defeated {
                ctx.info(format!("{} is defeated", name));
            }
        }
    }
    Ok(Outcome::Applied)
}

fn heal(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, CombatError> {
    let query = directive.field(0).unwrap_or("player");
    let amount = parse_amount(directive, 1)?;
    if !matches!(resolve_target(ctx, query), Some(Target::Player)) {
        return Err(CombatError::PlayerOnly(directive.kind));
    }

    let mut roll = ctx.roller();
    let rolled = amount.resolve(&mut roll);
    let restored = ctx.character.heal(rolled.value);
    if restored == 0 {
        return Ok(Outcome::Ignored);
    }
    sync_player_combatant(ctx);
    tracing::info!(restored, hp = ctx.character.hp, "Player healed");
    ctx.info(format!("{} regains {} hit points", ctx.character.name, restored));
    Ok(Outcome::Applied)
}

fn temp_hp(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, CombatError> {
    let query = directive.field(0).unwrap_or("player");
    let amount = parse_amount(directive, 1)?;
    if !matches!(resolve_target(ctx, query), Some(Target::Player)) {
        return Err(CombatError::PlayerOnly(directive.kind));
    }

    let mut roll = ctx.roller();
    let rolled = amount.resolve(&mut roll);
    ctx.character.temp_hp = apply_temp_hp(ctx.character.temp_hp, rolled.value);
    sync_player_combatant(ctx);
    tracing::debug!(temp_hp = ctx.character.temp_hp, "Temporary hit points set");
    Ok(Outcome::Applied)
}

fn toggle_defense(
    directive: &Directive,
    ctx: &mut DispatchContext<'_>,
    category: DefenseCategory,
    add: bool,
) -> Result<Outcome, CombatError> {
    let damage_type = directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation("Damage type is required"))?;

    let changed = if add {
        ctx.character.defenses.add(category, damage_type)
    } else {
        ctx.character.defenses.remove(category, damage_type)
    };
    if !changed {
        return Ok(Outcome::Ignored);
    }
    sync_player_combatant(ctx);
    tracing::debug!(%category, damage_type, add, "Defense toggled");
    Ok(Outcome::Applied)
}

fn next_turn(ctx: &mut DispatchContext<'_>) -> Outcome {
    if ctx.encounter_change_pending() {
        return Outcome::Deferred;
    }
    let Some(encounter) = ctx.session.encounter.as_mut() else {
        return Outcome::Ignored;
    };
    let new_round = encounter.advance_turn();
    let round = encounter.round;
    let current = encounter.current().map(|c| c.name.clone());

    if new_round {
        tracing::debug!(round, "New combat round");
        for spell in advance_effects(ctx.session, ctx.character, ctx.catalog, DurationUnit::Rounds, 1) {
            ctx.info(format!("{} has ended", spell));
        }
        sync_player_combatant(ctx);
    }
    if let Some(name) = current {
        ctx.info(format!("Round {}: {}'s turn", round, name));
    }
    Outcome::Applied
}

#[cfg(test)]
mod tests {
    use crate::infrastructure::clock::ScriptedRandom;
    use crate::use_cases::dispatch::testing::Fixture;
    use crate::use_cases::dispatch::NotificationKind;
    use chronicler_domain::{
        CombatantId, Combatant, Concentration, DefenseCategory, Defenses, Encounter,
    };

    fn goblin(name: &str, initiative: i32) -> Combatant {
        Combatant {
            id: CombatantId::new(),
            name: name.to_string(),
            hp: 7,
            max_hp: 7,
            armor_class: 15,
            temp_hp: 0,
            initiative,
            is_player: false,
            defenses: Defenses::default(),
            conditions: Vec::new(),
        }
    }

    fn player(fixture: &Fixture, initiative: i32) -> Combatant {
        Combatant {
            id: CombatantId::new(),
            name: fixture.character.name.clone(),
            hp: fixture.character.hp,
            max_hp: fixture.character.max_hp,
            armor_class: fixture.character.armor_class,
            temp_hp: 0,
            initiative,
            is_player: true,
            defenses: Defenses::default(),
            conditions: Vec::new(),
        }
    }

    #[test]
    fn temp_hp_absorbs_damage_first() {
        let mut fixture = Fixture::new();
        fixture.dispatch("TEMP_HP[player|5] DAMAGE[player|8]");

        assert_eq!(fixture.character.temp_hp, 0);
        assert_eq!(fixture.character.hp, 9);
    }

    #[test]
    fn temp_hp_replaces_instead_of_stacking() {
        let mut fixture = Fixture::new();
        fixture.dispatch("TEMP_HP[player|5] TEMP_HP[you|3]");
        assert_eq!(fixture.character.temp_hp, 3);
    }

    #[test]
    fn resistance_halves_and_vulnerability_cancels_it() {
        let mut fixture = Fixture::new();
        fixture.dispatch("RESISTANCE_ADD[fire] DAMAGE[player|7|fire]");
        assert_eq!(fixture.character.hp, 9);

        fixture.dispatch("RESISTANCE_ADD[fire] DAMAGE[player|7|fire] VULNERABILITY_ADD[Fire] DAMAGE[player|4|fire]");
        assert_eq!(fixture.character.hp, 5);
    }

    #[test]
    fn immunity_zeroes_and_hp_clamps_at_zero() {
        let mut fixture = Fixture::new();
        fixture.dispatch("IMMUNITY_ADD[poison] DAMAGE[player|50|poison] DAMAGE[player|50|slashing]");
        assert_eq!(fixture.character.hp, 0);
        assert!(fixture
            .character
            .defenses
            .has(DefenseCategory::Immunity, "poison"));
    }

    #[test]
    fn extreme_amounts_clamp_without_overflow() {
        let mut fixture = Fixture::new();
        fixture.character.hp = 1;
        fixture.dispatch("HEAL[player|2147483647]");
        assert_eq!(fixture.character.hp, fixture.character.max_hp);

        fixture.dispatch("VULNERABILITY_ADD[fire] DAMAGE[player|2000000000|fire]");
        assert_eq!(fixture.character.hp, 0);
    }

    #[test]
    fn defense_toggles_are_deduplicated() {
        let mut fixture = Fixture::new();
        fixture.dispatch("RESISTANCE_ADD[cold] RESISTANCE_ADD[COLD] RESISTANCE_REMOVE[acid]");
        assert_eq!(fixture.character.defenses.resistances, vec!["cold".to_string()]);
    }

    #[test]
    fn healing_clamps_at_max_and_ignores_enemies() {
        let mut fixture = Fixture::new();
        fixture.character.hp = 4;
        fixture.session.encounter = Some(Encounter::new(vec![goblin("Goblin", 10)]));

        fixture.dispatch("HEAL[Goblin|5] HEAL[player|2d6+10]");
        assert_eq!(fixture.character.hp, fixture.character.max_hp);
        assert_eq!(fixture.session.encounter.as_ref().unwrap().combatants[0].hp, 7);
    }

    #[test]
    fn enemy_at_zero_is_marked_defeated_once() {
        let mut fixture = Fixture::new();
        fixture.session.encounter = Some(Encounter::new(vec![goblin("Goblin", 10)]));

        let notifications = fixture.dispatch("DAMAGE[gob|10|slashing] DAMAGE[Goblin|3]");
        let goblin = &fixture.session.encounter.as_ref().unwrap().combatants[0];
        assert_eq!(goblin.hp, 0);
        assert_eq!(goblin.conditions, vec!["Defeated".to_string()]);
        assert_eq!(
            notifications
                .iter()
                .filter(|n| n.message == "Goblin is defeated")
                .count(),
            1
        );
    }

    #[test]
    fn unknown_targets_are_left_for_a_later_pass() {
        let mut fixture = Fixture::new();
        fixture.dispatch("DAMAGE[Orc|5]");
        assert!(fixture.registry.is_empty());

        fixture.session.encounter = Some(Encounter::new(vec![goblin("Orc", 10)]));
        fixture.dispatch("DAMAGE[Orc|5]");
        assert_eq!(fixture.session.encounter.as_ref().unwrap().combatants[0].hp, 2);
        assert_eq!(fixture.registry.len(), 1);
    }

    #[test]
    fn failed_concentration_check_ends_the_spell() {
        // Fighter: CON +2, not proficient. d20 of 1 against DC 10 fails.
        let mut fixture = Fixture::new().with_random(ScriptedRandom::new([1]));
        fixture.session.concentration = Some(Concentration {
            spell_name: "Bless".into(),
            instance: None,
        });

        let notifications = fixture.dispatch("DAMAGE[player|4]");
        assert!(fixture.session.concentration.is_none());
        assert!(notifications
            .iter()
            .any(|n| n.kind == NotificationKind::ConcentrationBroken));
    }

    #[test]
    fn damage_absorbed_by_temp_hp_still_tests_concentration() {
        let mut fixture = Fixture::new().with_random(ScriptedRandom::new([1]));
        fixture.character.temp_hp = 10;
        fixture.session.concentration = Some(Concentration {
            spell_name: "Bless".into(),
            instance: None,
        });

        fixture.dispatch("DAMAGE[player|4]");
        assert_eq!(fixture.character.hp, fixture.character.max_hp);
        assert_eq!(fixture.character.temp_hp, 6);
        assert!(fixture.session.concentration.is_none());
    }

    #[test]
    fn passed_concentration_check_keeps_the_spell() {
        let mut fixture = Fixture::new().with_random(ScriptedRandom::new([15]));
        fixture.session.concentration = Some(Concentration {
            spell_name: "Bless".into(),
            instance: None,
        });

        fixture.dispatch("DAMAGE[player|4]");
        assert!(fixture.session.concentration.is_some());
    }

    #[test]
    fn next_turn_wraps_rounds_and_expires_round_effects() {
        let mut fixture = Fixture::with_class("Wizard");
        let mut encounter = Encounter::new(vec![goblin("Goblin", 5)]);
        encounter.combatants.push(player(&fixture, 1));
        fixture.session.encounter = Some(encounter);

        fixture.dispatch("CAST[Shield] NEXT_TURN[]");
        assert_eq!(fixture.character.armor_class, 17);
        assert_eq!(fixture.session.encounter.as_ref().unwrap().round, 1);

        fixture.dispatch("CAST[Shield] NEXT_TURN[] NEXT_TURN[]");
        let encounter = fixture.session.encounter.as_ref().unwrap();
        assert_eq!(encounter.round, 2);
        assert_eq!(encounter.turn, 0);
        assert_eq!(fixture.character.armor_class, 12);
        assert_eq!(encounter.combatants[1].armor_class, 12);
    }
}
