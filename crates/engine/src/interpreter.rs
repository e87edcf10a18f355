//! The interpreter session.
//!
//! Owns the state of one play session together with everything needed to
//! interpret a narrated message: the growing text buffer, the dedup registry,
//! the item-generation queue and the debounced saver. Each chunk is parsed in
//! streaming mode and dispatched; the finished message gets one terminal pass
//! with full context.

use std::sync::Arc;
use std::time::Duration;

use chronicler_domain::catalog::Catalog;
use chronicler_domain::directive::{parse_directives, DedupRegistry, Directive, ParseMode};
use chronicler_domain::{CharacterState, SessionState};

use crate::infrastructure::debounced_saver::DebouncedSaver;
use crate::infrastructure::ports::{
    ClockPort, ItemGeneratorPort, RandomPort, SavedGame, StateStorePort, StoreError,
    WorldLookupPort,
};
use crate::use_cases::dispatch::{DispatchContext, Dispatcher, Notification};
use crate::use_cases::encounter::prepare_encounters;
use crate::use_cases::equipment::refresh_armor_class;
use crate::use_cases::item_generation::{apply_completed, GeneratedItem, ItemGenerationQueue};
use crate::use_cases::level_up::{LevelUpDraft, LevelUpError};

/// External collaborators of a session
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn ItemGeneratorPort>,
    pub store: Arc<dyn StateStorePort>,
    pub world: Arc<dyn WorldLookupPort>,
    pub random: Arc<dyn RandomPort>,
    pub clock: Arc<dyn ClockPort>,
}

/// Result of the terminal pass over a complete message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOutput {
    /// The message with every directive span removed
    pub display_text: String,
    pub notifications: Vec<Notification>,
}

pub struct Interpreter {
    session: SessionState,
    character: CharacterState,
    catalog: Catalog,
    registry: DedupRegistry,
    buffer: String,
    /// Produced between messages (by generated-item merges), reported with
    /// the next output
    held_notifications: Vec<Notification>,
    generation: ItemGenerationQueue,
    saver: DebouncedSaver,
    world: Arc<dyn WorldLookupPort>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl Interpreter {
    /// Start interpreting for `game`. Spawns the saver task, so this must run
    /// inside a tokio runtime. Requests left pending by an earlier run are
    /// restarted.
    pub fn new(
        game: SavedGame,
        catalog: Catalog,
        collaborators: Collaborators,
        save_debounce: Duration,
    ) -> Self {
        let Collaborators {
            generator,
            store,
            world,
            random,
            clock,
        } = collaborators;

        let mut generation = ItemGenerationQueue::new(generator);
        let resumed = generation.spawn_pending(&game.session.pending_items);
        if resumed > 0 {
            tracing::info!(count = resumed, "Resumed pending item generation");
        }

        Self {
            session: game.session,
            character: game.character,
            catalog,
            registry: DedupRegistry::new(),
            buffer: String::new(),
            held_notifications: Vec::new(),
            generation,
            saver: DebouncedSaver::spawn(store, save_debounce),
            world,
            random,
            clock,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn character(&self) -> &CharacterState {
        &self.character
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn snapshot(&self) -> SavedGame {
        SavedGame {
            session: self.session.clone(),
            character: self.character.clone(),
        }
    }

    /// Forget the previous message. Directive positions restart at zero, so
    /// the registry starts over too.
    pub fn begin_message(&mut self) {
        self.buffer.clear();
        self.registry.reset();
    }

    /// Append a chunk and dispatch everything settled so far.
    pub fn feed_chunk(&mut self, chunk: &str) -> Vec<Notification> {
        self.merge_completed();
        self.buffer.push_str(chunk);

        let parsed = parse_directives(&self.buffer, ParseMode::Streaming);
        let mut notifications = self.take_notifications();
        notifications.extend(self.pass(&Dispatcher::streaming(), &parsed.directives));
        self.after_pass();
        notifications
    }

    /// Run the terminal pass over the complete buffer.
    pub async fn finish_message(&mut self) -> MessageOutput {
        self.merge_completed();

        let parsed = parse_directives(&self.buffer, ParseMode::Final);
        let prepared =
            prepare_encounters(&parsed.directives, &self.registry, self.world.as_ref()).await;
        let terminal = Dispatcher::terminal(prepared);
        let mut notifications = self.take_notifications();
        notifications.extend(self.pass(&terminal, &parsed.directives));
        self.after_pass();

        tracing::debug!(
            directives = parsed.directives.len(),
            settled = self.registry.len(),
            "Message finished"
        );
        MessageOutput {
            display_text: parsed.display_text,
            notifications,
        }
    }

    /// Interpret a complete message in one go.
    pub async fn interpret(&mut self, text: &str) -> MessageOutput {
        self.begin_message();
        self.buffer.push_str(text);
        self.finish_message().await
    }

    fn pass(&mut self, dispatcher: &Dispatcher, directives: &[Directive]) -> Vec<Notification> {
        let mut ctx = DispatchContext::new(
            &mut self.session,
            &mut self.character,
            &self.catalog,
            self.random.as_ref(),
            self.clock.as_ref(),
            &mut self.registry,
        );
        dispatcher.run(directives, &mut ctx);
        ctx.into_notifications()
    }

    fn after_pass(&mut self) {
        self.generation.spawn_pending(&self.session.pending_items);
        self.schedule_save();
    }

    fn schedule_save(&self) {
        self.saver.schedule(self.snapshot());
    }

    /// Notifications produced outside a message since the last output.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.held_notifications)
    }

    /// Merge generated items that have already arrived. Returns how many merged.
    pub fn merge_completed(&mut self) -> usize {
        let completed = self.generation.drain_completed();
        if completed.is_empty() {
            return 0;
        }
        let merged = self.merge(completed);
        self.schedule_save();
        merged
    }

    /// Wait for every in-flight generation task and merge its result.
    pub async fn settle_generation(&mut self) -> usize {
        let mut merged = 0;
        while let Some(item) = self.generation.next_completed().await {
            merged += self.merge(vec![item]);
        }
        self.schedule_save();
        merged
    }

    /// Merge results, then dispatch the directive effects of merged items
    /// that are already equipped. Those directives belong to no message, so
    /// they get a registry of their own.
    fn merge(&mut self, completed: Vec<GeneratedItem>) -> usize {
        let report = apply_completed(
            completed,
            &mut self.session,
            &mut self.character,
            &self.catalog,
        );
        if !report.directives.is_empty() {
            let mut registry = DedupRegistry::new();
            let mut ctx = DispatchContext::new(
                &mut self.session,
                &mut self.character,
                &self.catalog,
                self.random.as_ref(),
                self.clock.as_ref(),
                &mut registry,
            );
            Dispatcher::streaming().run_detached(&report.directives, &mut ctx);
            self.held_notifications.extend(ctx.into_notifications());
        }
        report.merged
    }

    /// Drop all in-flight work for this session. Placeholders stay as they are.
    pub fn abandon(&mut self) {
        self.generation.cancel();
        self.registry.reset();
        self.buffer.clear();
        self.held_notifications.clear();
        let dropped = std::mem::take(&mut self.session.pending_items).len();
        tracing::info!(session = %self.session.id, dropped, "Session abandoned");
        self.schedule_save();
    }

    pub fn begin_level_up(&self) -> Result<LevelUpDraft, LevelUpError> {
        LevelUpDraft::begin(&self.character)
    }

    pub fn commit_level_up(&mut self, draft: LevelUpDraft) -> Result<(), LevelUpError> {
        draft.commit(&mut self.character)?;
        refresh_armor_class(&mut self.character, &self.session, &self.catalog);
        self.schedule_save();
        Ok(())
    }

    /// Write the latest state now.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.saver.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bestiary::BuiltinBestiary;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::{MockItemGeneratorPort, MockStateStorePort};
    use crate::use_cases::dispatch::NotificationKind;
    use chronicler_domain::{
        AbilityScores, DefenseCategory, ItemCategory, ItemDefinition, SessionId,
    };
    use chrono::TimeZone;

    fn fighter() -> CharacterState {
        CharacterState::new(
            "Rook",
            "Fighter",
            AbilityScores {
                strength: 16,
                dexterity: 14,
                constitution: 14,
                ..Default::default()
            },
        )
    }

    fn interpreter_for(character: CharacterState, generator: MockItemGeneratorPort) -> Interpreter {
        let mut store = MockStateStorePort::new();
        store.expect_save().returning(|_| Ok(()));
        let collaborators = Collaborators {
            generator: Arc::new(generator),
            store: Arc::new(store),
            world: Arc::new(BuiltinBestiary::default()),
            random: Arc::new(FixedRandom(3)),
            clock: Arc::new(FixedClock(
                chrono::Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            )),
        };
        Interpreter::new(
            SavedGame {
                session: SessionState::new(SessionId::new()),
                character,
            },
            Catalog::builtin(),
            collaborators,
            Duration::from_secs(60),
        )
    }

    fn interpreter(character: CharacterState) -> Interpreter {
        interpreter_for(character, MockItemGeneratorPort::new())
    }

    fn stream(interpreter: &mut Interpreter, text: &str, chunk: usize) -> Vec<Notification> {
        interpreter.begin_message();
        let chars: Vec<char> = text.chars().collect();
        let mut notifications = Vec::new();
        for piece in chars.chunks(chunk) {
            notifications.extend(interpreter.feed_chunk(&piece.iter().collect::<String>()));
        }
        notifications
    }

    #[tokio::test]
    async fn fire_resistance_halves_damage() {
        let mut character = fighter();
        character.defenses.add(DefenseCategory::Resistance, "fire");
        let mut interpreter = interpreter(character);

        let output = interpreter
            .interpret("You take DAMAGE[player|10|fire] damage.")
            .await;

        assert_eq!(interpreter.character().hp, 7);
        assert_eq!(output.display_text, "You take damage.");
    }

    #[tokio::test]
    async fn potion_is_added_then_used_once() {
        let mut character = fighter();
        character.hp = 1;
        let mut interpreter = interpreter(character);

        let text = "You find INVENTORY_ADD[Healing Potion|1] on the shelf. \
                    Later you drink it. USE_ITEM[Healing Potion]";
        stream(&mut interpreter, text, 7);
        interpreter.finish_message().await;

        assert!(interpreter.session().inventory.is_empty());
        // 2d4+2 with every die showing 3
        assert_eq!(interpreter.character().hp, 9);
    }

    #[tokio::test]
    async fn cast_without_slots_changes_nothing() {
        let mut wizard = CharacterState::new("Vex", "Wizard", AbilityScores::default());
        while wizard.spell_slots.consume(1).is_ok() {}
        let mut interpreter = interpreter(wizard);
        let before = interpreter.snapshot();

        let output = interpreter.interpret("CAST[Magic Missile]").await;

        assert_eq!(output.notifications.len(), 1);
        assert_eq!(output.notifications[0].kind, NotificationKind::Refusal);
        assert_eq!(interpreter.snapshot(), before);
    }

    #[tokio::test]
    async fn level_notice_is_sent_once_per_message() {
        let mut character = fighter();
        character.xp = 300;
        let mut interpreter = interpreter(character);

        let text = "XP_GAIN[300|Defeated dragon] You loot GOLD[5] and travel to LOCATION[Waterdeep]. \
                    RELATIONSHIP[Innkeeper|+1]";
        let mut notifications = stream(&mut interpreter, text, 5);
        notifications.extend(interpreter.finish_message().await.notifications);

        let notices = notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::LevelAvailable)
            .count();
        assert_eq!(notices, 1);
        assert_eq!(interpreter.character().xp, 600);
    }

    #[tokio::test]
    async fn streaming_and_one_shot_apply_the_same_directives() {
        let text = "GOLD[12] The goblins attack! COMBAT_START[Goblin, Goblin] \
                    DAMAGE[Goblin 2|4|slashing] DAMAGE[player|3] \
                    INVENTORY_ADD[Rope|2] INVENTORY_REMOVE[Rope|1] STATUS_ADD[Poisoned|Goblin blade]";

        let mut streamed = interpreter(fighter());
        let mut notifications = stream(&mut streamed, text, 3);
        let streamed_output = streamed.finish_message().await;
        notifications.extend(streamed_output.notifications);

        let mut one_shot = interpreter(fighter());
        let one_shot_output = one_shot.interpret(text).await;

        assert_eq!(streamed_output.display_text, one_shot_output.display_text);
        assert_eq!(notifications.len(), one_shot_output.notifications.len());
        assert_eq!(streamed.session().currency, one_shot.session().currency);
        assert_eq!(streamed.session().inventory, one_shot.session().inventory);
        assert_eq!(streamed.session().conditions, one_shot.session().conditions);
        assert_eq!(streamed.character().hp, one_shot.character().hp);

        let hp_of = |interpreter: &Interpreter, name: &str| {
            interpreter
                .session()
                .encounter
                .as_ref()
                .and_then(|e| e.combatants.iter().find(|c| c.name == name))
                .map(|c| c.hp)
        };
        assert_eq!(hp_of(&streamed, "Goblin 2"), Some(3));
        assert_eq!(hp_of(&one_shot, "Goblin 2"), Some(3));
    }

    #[tokio::test]
    async fn replacing_an_encounter_streams_like_one_shot() {
        let text = "A new band arrives. COMBAT_START[Goblin] You slash DAMAGE[Goblin|4|slashing]";
        let goblin_hp = |interpreter: &Interpreter| {
            interpreter
                .session()
                .encounter
                .as_ref()
                .and_then(|e| e.combatants.iter().find(|c| c.name == "Goblin"))
                .map(|c| c.hp)
        };

        let mut streamed = interpreter(fighter());
        streamed.interpret("COMBAT_START[Goblin]").await;
        stream(&mut streamed, text, 1);
        streamed.finish_message().await;

        let mut one_shot = interpreter(fighter());
        one_shot.interpret("COMBAT_START[Goblin]").await;
        one_shot.interpret(text).await;

        assert_eq!(goblin_hp(&one_shot), Some(3));
        assert_eq!(goblin_hp(&streamed), goblin_hp(&one_shot));
    }

    #[tokio::test]
    async fn generated_items_merge_and_abandon_clears_pending_work() {
        let mut generator = MockItemGeneratorPort::new();
        generator.expect_generate().returning(|_, _| {
            Ok(ItemDefinition::new("gen", "Generated", ItemCategory::Magic).with_effect("+1 AC"))
        });
        let mut interpreter = interpreter_for(fighter(), generator);

        interpreter
            .interpret("INVENTORY_ADD[Moonstone Circlet] EQUIP[Moonstone Circlet]")
            .await;
        assert_eq!(interpreter.session().pending_items.len(), 1);

        assert_eq!(interpreter.settle_generation().await, 1);
        assert!(interpreter.session().pending_items.is_empty());
        assert_eq!(interpreter.character().armor_class, 13);

        interpreter.interpret("INVENTORY_ADD[Whispering Idol]").await;
        assert_eq!(interpreter.session().pending_items.len(), 1);
        interpreter.abandon();
        assert!(interpreter.session().pending_items.is_empty());
        assert!(interpreter.buffer().is_empty());
        assert_eq!(interpreter.settle_generation().await, 0);
    }

    #[tokio::test]
    async fn merged_equipped_item_fires_its_directive_effects() {
        let mut generator = MockItemGeneratorPort::new();
        generator.expect_generate().returning(|_, _| {
            Ok(ItemDefinition::new("gen", "Generated", ItemCategory::Magic)
                .with_effect("+1 AC")
                .with_effect("TEMP_HP[player|6]"))
        });
        let mut interpreter = interpreter_for(fighter(), generator);

        interpreter
            .interpret("INVENTORY_ADD[Warding Brooch] EQUIP[Warding Brooch]")
            .await;
        assert_eq!(interpreter.character().temp_hp, 0);

        assert_eq!(interpreter.settle_generation().await, 1);
        assert_eq!(interpreter.character().temp_hp, 6);
        assert_eq!(interpreter.character().armor_class, 13);
        assert!(interpreter.take_notifications().is_empty());

        // A later message dispatches from offset zero without tripping over
        // the merged effects
        interpreter.interpret("TEMP_HP[player|2]").await;
        assert_eq!(interpreter.character().temp_hp, 2);
    }

    #[tokio::test]
    async fn level_up_rederives_armor_class() {
        let mut character = fighter();
        character.xp = 300;
        let mut interpreter = interpreter(character);
        interpreter.interpret("INVENTORY_ADD[Leather Armor] EQUIP[Leather Armor]").await;
        let armor_class = interpreter.character().armor_class;

        let draft = interpreter.begin_level_up().unwrap();
        interpreter.commit_level_up(draft).unwrap();

        assert_eq!(interpreter.character().level, 2);
        assert_eq!(interpreter.character().armor_class, armor_class);
        interpreter.flush().await.unwrap();
    }
}
