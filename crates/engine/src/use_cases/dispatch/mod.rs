//! Dispatch orchestration.
//!
//! Runs every handler, in a fixed order, over the directives of one parse
//! pass. The dedup registry filters occurrences that were already settled, so
//! the same growing buffer can be dispatched any number of times.

use chronicler_domain::catalog::Catalog;
use chronicler_domain::directive::{
    parse_directives, DedupRegistry, Directive, DirectiveKind, ParseMode, Position,
};
use chronicler_domain::{CharacterState, SessionState};
use std::collections::HashMap;

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// Rounds of re-injected directives followed within one pass.
const MAX_INJECTION_ROUNDS: usize = 4;

/// Origin of directives that do not come from the message buffer.
const DETACHED_ORIGIN: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Info,
    /// An operation was refused for lack of resources or a missing item
    Refusal,
    LevelAvailable,
    ConcentrationBroken,
    Roll,
}

/// User-facing message produced by a handler
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// How a handler settled one directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed
    Applied,
    /// Refused with a notification; state unchanged
    Refused,
    /// Semantically invalid or a no-op; nothing to report
    Ignored,
    /// Needs context that may appear later in the message (an enemy not yet
    /// spawned). Left unsettled so a later pass can retry it.
    Deferred,
}

impl Outcome {
    fn settles(&self) -> bool {
        !matches!(self, Self::Deferred)
    }
}

/// Mutable state and collaborators visible to handlers during a pass
pub struct DispatchContext<'a> {
    pub session: &'a mut SessionState,
    pub character: &'a mut CharacterState,
    pub catalog: &'a Catalog,
    pub random: &'a dyn RandomPort,
    pub clock: &'a dyn ClockPort,
    pub registry: &'a mut DedupRegistry,
    notifications: Vec<Notification>,
    injected: Vec<String>,
    encounter_change_pending: bool,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        session: &'a mut SessionState,
        character: &'a mut CharacterState,
        catalog: &'a Catalog,
        random: &'a dyn RandomPort,
        clock: &'a dyn ClockPort,
        registry: &'a mut DedupRegistry,
    ) -> Self {
        Self {
            session,
            character,
            catalog,
            random,
            clock,
            registry,
            notifications: Vec::new(),
            injected: Vec::new(),
            encounter_change_pending: false,
        }
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }

    /// Report a refusal and return the matching outcome.
    pub fn refuse(&mut self, message: impl Into<String>) -> Outcome {
        self.notify(NotificationKind::Refusal, message);
        Outcome::Refused
    }

    /// Queue a raw directive (e.g. "HEAL[player|2d4+2]") to fold into this pass.
    pub fn inject(&mut self, raw: impl Into<String>) {
        self.injected.push(raw.into());
    }

    /// Inclusive range generator for dice rolls.
    pub fn roller(&self) -> impl FnMut(i32, i32) -> i32 + 'a {
        let random: &'a dyn RandomPort = self.random;
        move |min, max| random.gen_range(min, max)
    }

    pub fn d20(&self) -> i32 {
        self.random.gen_range(1, 20)
    }

    /// True while an unsettled COMBAT_START or COMBAT_END is in the pass.
    /// The active encounter is about to be replaced, so combatants in it
    /// must not be targeted yet.
    pub fn encounter_change_pending(&self) -> bool {
        self.encounter_change_pending
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }

    fn take_injected(&mut self) -> Vec<String> {
        std::mem::take(&mut self.injected)
    }
}

/// One family of directive kinds.
pub trait DirectiveHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn handles(&self, kind: DirectiveKind) -> bool;
    fn apply(&self, directive: &Directive, ctx: &mut DispatchContext<'_>) -> Outcome;
}

/// Owns the handler chain and runs it over a directive list.
pub struct Dispatcher {
    handlers: Vec<Box<dyn DirectiveHandler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Box<dyn DirectiveHandler>>) -> Self {
        Self { handlers }
    }

    /// The per-chunk chain: inventory, combat, spellcasting, narrative,
    /// renewable resources, then dice rolls last.
    pub fn streaming() -> Self {
        Self::new(standard_chain())
    }

    /// The full-context chain: encounter lifecycle first, then the standard chain.
    pub fn terminal(encounters: crate::use_cases::encounter::PreparedEncounters) -> Self {
        let mut handlers: Vec<Box<dyn DirectiveHandler>> = vec![Box::new(
            crate::use_cases::encounter::EncounterHandler::new(encounters),
        )];
        handlers.extend(standard_chain());
        Self::new(handlers)
    }

    /// Dispatch `directives`, then any directives injected while doing so.
    pub fn run(&self, directives: &[Directive], ctx: &mut DispatchContext<'_>) {
        let mut batch = directives.to_vec();
        let mut next_index: HashMap<usize, usize> = HashMap::new();

        for round in 0..MAX_INJECTION_ROUNDS {
            let mut injected = Vec::new();
            for handler in &self.handlers {
                ctx.encounter_change_pending = directives
                    .iter()
                    .chain(batch.iter())
                    .any(|d| d.kind.is_terminal_only() && !ctx.registry.contains(&d.key()));
                for directive in batch.iter().filter(|d| handler.handles(d.kind)) {
                    let key = directive.key();
                    if ctx.registry.contains(&key) {
                        continue;
                    }

                    let outcome = handler.apply(directive, ctx);
                    tracing::debug!(
                        handler = handler.name(),
                        directive = %directive.raw,
                        ?outcome,
                        "Directive dispatched"
                    );
                    if outcome.settles() {
                        ctx.registry.mark(key);
                    }

                    let origin = directive.position.origin();
                    for raw in ctx.take_injected() {
                        for mut child in parse_directives(&raw, ParseMode::Final).directives {
                            let index = next_index.entry(origin).or_insert(0);
                            child.position = Position::Injected {
                                origin,
                                index: *index,
                            };
                            *index += 1;
                            injected.push(child);
                        }
                    }
                }
            }

            if injected.is_empty() {
                return;
            }
            if round + 1 == MAX_INJECTION_ROUNDS {
                tracing::warn!(
                    dropped = injected.len(),
                    "Injected directives nested too deeply, dropping remainder"
                );
                return;
            }
            batch = injected;
        }
    }
}

impl Dispatcher {
    /// Dispatch raw directives that arrived outside any message, such as the
    /// effects of an equipped item whose definition was generated later.
    /// They are positioned as injected so they never collide with buffer
    /// offsets.
    pub fn run_detached(&self, raws: &[String], ctx: &mut DispatchContext<'_>) {
        let directives: Vec<Directive> = raws
            .iter()
            .flat_map(|raw| parse_directives(raw, ParseMode::Final).directives)
            .enumerate()
            .map(|(index, mut directive)| {
                directive.position = Position::Injected {
                    origin: DETACHED_ORIGIN,
                    index,
                };
                directive
            })
            .collect();
        self.run(&directives, ctx);
    }
}

fn standard_chain() -> Vec<Box<dyn DirectiveHandler>> {
    use crate::use_cases::{combat, dice_roll, inventory, narrative, rest, spellcasting};

    vec![
        Box::new(inventory::InventoryHandler),
        Box::new(combat::CombatHandler),
        Box::new(spellcasting::SpellcastingHandler),
        Box::new(narrative::NarrativeHandler),
        Box::new(rest::RestHandler),
        Box::new(dice_roll::DiceRollHandler),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for handler tests.

    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use chronicler_domain::{AbilityScores, SessionId};
    use chrono::TimeZone;

    pub struct Fixture {
        pub session: SessionState,
        pub character: CharacterState,
        pub catalog: Catalog,
        pub registry: DedupRegistry,
        pub random: Box<dyn RandomPort>,
        pub clock: FixedClock,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_class("Fighter")
        }

        pub fn with_class(class_name: &str) -> Self {
            let character = CharacterState::new(
                "Rook",
                class_name,
                AbilityScores {
                    strength: 16,
                    dexterity: 14,
                    constitution: 14,
                    ..Default::default()
                },
            );
            Self {
                session: SessionState::new(SessionId::new()),
                character,
                catalog: Catalog::builtin(),
                registry: DedupRegistry::new(),
                random: Box::new(FixedRandom(3)),
                clock: FixedClock(
                    chrono::Utc
                        .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
                        .unwrap(),
                ),
            }
        }

        pub fn with_random(mut self, random: impl RandomPort + 'static) -> Self {
            self.random = Box::new(random);
            self
        }

        /// Parse `text` in final mode and run the streaming chain over it.
        pub fn dispatch(&mut self, text: &str) -> Vec<Notification> {
            self.dispatch_with(&Dispatcher::streaming(), text, ParseMode::Final)
        }

        pub fn dispatch_with(
            &mut self,
            dispatcher: &Dispatcher,
            text: &str,
            mode: ParseMode,
        ) -> Vec<Notification> {
            let parsed = parse_directives(text, mode);
            let mut ctx = DispatchContext::new(
                &mut self.session,
                &mut self.character,
                &self.catalog,
                self.random.as_ref(),
                &self.clock,
                &mut self.registry,
            );
            dispatcher.run(&parsed.directives, &mut ctx);
            ctx.into_notifications()
        }
    }
}
