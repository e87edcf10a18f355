//! Narrative progression: location, relationships, suggestions, quests, and XP.
//!
//! Leveling itself is a separate caller-driven flow (see `level_up`); this
//! handler only records XP and announces when a level becomes available.

use chronicler_domain::directive::{parse_count, parse_signed};
use chronicler_domain::{Directive, DirectiveKind, DomainError, QuestEntry, XpEntry};

use crate::use_cases::dispatch::{DirectiveHandler, DispatchContext, NotificationKind, Outcome};

pub struct NarrativeHandler;

impl DirectiveHandler for NarrativeHandler {
    fn name(&self) -> &'static str {
        "narrative"
    }

    fn handles(&self, kind: DirectiveKind) -> bool {
        matches!(
            kind,
            DirectiveKind::Location
                | DirectiveKind::Relationship
                | DirectiveKind::Suggest
                | DirectiveKind::QuestAdd
                | DirectiveKind::QuestComplete
                | DirectiveKind::XpGain
        )
    }

    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome {
        let result = match directive.kind {
            DirectiveKind::Location => set_location(directive, ctx),
            DirectiveKind::Relationship => adjust_relationship(directive, ctx),
            DirectiveKind::Suggest => suggest(directive, ctx),
            DirectiveKind::QuestAdd => add_quest(directive, ctx),
            DirectiveKind::QuestComplete => complete_quest(directive, ctx),
            DirectiveKind::XpGain => gain_xp(directive, ctx),
            _ => Ok(Outcome::Ignored),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(directive = %directive.raw, error = %err, "Narrative directive skipped");
            Outcome::Ignored
        })
    }
}

fn required<'d>(directive: &'d Directive, what: &str) -> Result<&'d str, DomainError> {
    directive
        .field(0)
        .map(str::trim)
        .ok_or_else(|| DomainError::validation(format!("{} is required", what)))
}

fn set_location(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, DomainError> {
    let name = required(directive, "Location")?;
    if ctx.session.location.as_deref() == Some(name) {
        return Ok(Outcome::Ignored);
    }

    ctx.session.location = Some(name.to_string());
    if !ctx.session.visited.iter().any(|v| v.eq_ignore_ascii_case(name)) {
        ctx.session.visited.push(name.to_string());
    }
    tracing::info!(location = %name, "Location changed");
    Ok(Outcome::Applied)
}

fn adjust_relationship(
    directive: &Directive,
    ctx: &mut DispatchContext<'_>,
) -> Result<Outcome, DomainError> {
    let entity = required(directive, "Entity")?;
    let delta = parse_signed(directive.field(1).unwrap_or_default())?;
    if delta == 0 {
        return Ok(Outcome::Ignored);
    }

    let score = ctx.session.relationships.entry(entity.to_string()).or_insert(0);
    *score = score.saturating_add(delta);
    tracing::debug!(entity = %entity, delta, score = *score, "Relationship adjusted");
    Ok(Outcome::Applied)
}

fn suggest(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, DomainError> {
    let action = directive.payload.trim();
    if action.is_empty() {
        return Err(DomainError::validation("Suggestion is empty"));
    }
    if ctx.session.suggestions.iter().any(|s| s == action) {
        return Ok(Outcome::Ignored);
    }
    ctx.session.suggestions.push(action.to_string());
    Ok(Outcome::Applied)
}

fn add_quest(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, DomainError> {
    let title = required(directive, "Quest title")?;
    if ctx.session.quests.iter().any(|q| q.title == title) {
        return Ok(Outcome::Ignored);
    }
    ctx.session.quests.push(QuestEntry {
        title: title.to_string(),
        completed: false,
    });
    ctx.info(format!("New quest: {}", title));
    Ok(Outcome::Applied)
}

fn complete_quest(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, DomainError> {
    let title = required(directive, "Quest title")?;
    match ctx.session.quests.iter_mut().find(|q| q.title == title) {
        Some(quest) if quest.completed => return Ok(Outcome::Ignored),
        Some(quest) => quest.completed = true,
        None => ctx.session.quests.push(QuestEntry {
            title: title.to_string(),
            completed: true,
        }),
    }
    ctx.info(format!("Quest completed: {}", title));
    Ok(Outcome::Applied)
}

fn gain_xp(directive: &Directive, ctx: &mut DispatchContext<'_>) -> Result<Outcome, DomainError> {
    let amount = parse_count(Some(required(directive, "XP amount")?), 0)?;
    if amount == 0 {
        return Ok(Outcome::Ignored);
    }
    let reason = directive.field(1).map(str::trim).unwrap_or_default();

    let character = &mut *ctx.character;
    character.xp = character.xp.saturating_add(amount);
    character.xp_log.push(XpEntry {
        amount,
        reason: reason.to_string(),
        awarded_at: ctx.clock.now(),
    });
    tracing::info!(amount, total = character.xp, reason = %reason, "XP gained");

    if character.can_level_up() && ctx.registry.claim_level_notice() {
        let next = character.level + 1;
        ctx.notify(
            NotificationKind::LevelAvailable,
            format!("Level {} is available", next),
        );
    }
    Ok(Outcome::Applied)
}

#[cfg(test)]
mod tests {
    use crate::use_cases::dispatch::testing::Fixture;
    use crate::use_cases::dispatch::NotificationKind;

    #[test]
    fn location_overwrites_and_history_is_deduplicated() {
        let mut fixture = Fixture::new();
        fixture.dispatch("LOCATION[Phandalin] LOCATION[Cragmaw Hideout] LOCATION[phandalin]");

        assert_eq!(fixture.session.location.as_deref(), Some("phandalin"));
        assert_eq!(fixture.session.visited, vec!["Phandalin", "Cragmaw Hideout"]);
    }

    #[test]
    fn relationships_accumulate_and_may_go_negative() {
        let mut fixture = Fixture::new();
        fixture.dispatch("RELATIONSHIP[Sildar|+2] RELATIONSHIP[Sildar|-5] RELATIONSHIP[Toblen|1]");

        assert_eq!(fixture.session.relationships.get("Sildar"), Some(&-3));
        assert_eq!(fixture.session.relationships.get("Toblen"), Some(&1));
    }

    #[test]
    fn suggestions_and_quests_deduplicate_by_text() {
        let mut fixture = Fixture::new();
        fixture.dispatch(
            "SUGGEST[Search the room] SUGGEST[Search the room] QUEST_ADD[Find Gundren] QUEST_ADD[Find Gundren] QUEST_COMPLETE[Find Gundren] QUEST_COMPLETE[Clear the mine]",
        );

        assert_eq!(fixture.session.suggestions.len(), 1);
        assert_eq!(fixture.session.quests.len(), 2);
        assert!(fixture.session.quests.iter().all(|q| q.completed));
    }

    #[test]
    fn xp_is_audited_with_the_injected_clock() {
        let mut fixture = Fixture::new();
        fixture.dispatch("XP_GAIN[50|Defeated goblins]");

        assert_eq!(fixture.character.xp, 50);
        let entry = &fixture.character.xp_log[0];
        assert_eq!(entry.reason, "Defeated goblins");
        assert_eq!(entry.awarded_at, fixture.clock.0);
    }

    #[test]
    fn level_available_is_announced_once_per_message() {
        let mut fixture = Fixture::new();
        let notifications = fixture.dispatch("XP_GAIN[200] XP_GAIN[200] XP_GAIN[50]");

        assert_eq!(fixture.character.xp, 450);
        let announcements: Vec<_> = notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::LevelAvailable)
            .collect();
        assert_eq!(announcements.len(), 1);
        assert_eq!(announcements[0].message, "Level 2 is available");

        fixture.registry.reset();
        let next = fixture.dispatch("XP_GAIN[10]");
        assert_eq!(
            next.iter()
                .filter(|n| n.kind == NotificationKind::LevelAvailable)
                .count(),
            1
        );
    }
}
