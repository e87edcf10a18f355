//! Fire-and-forget item generation.
//!
//! Unknown items get a rule-based placeholder immediately; a generation task
//! then produces the full definition in the background. Results come back
//! over a channel and are merged between dispatch passes.

use std::collections::HashSet;
use std::sync::Arc;

use chronicler_domain::catalog::Catalog;
use chronicler_domain::{CharacterState, ItemDefinition, PendingItemRequest, SessionState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::ports::{GenerationError, ItemGeneratorPort};
use crate::use_cases::equipment::{apply_item_effects, refresh_armor_class, remove_item_effects};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The placeholder was replaced. `reapplied` is set when it was equipped
    /// and its modifiers were swapped for the generated ones; `directives`
    /// holds the generated directive effects still to be dispatched.
    Merged {
        reapplied: bool,
        directives: Vec<String>,
    },
    /// No request is pending for this placeholder
    AlreadyMerged,
}

/// Replace a placeholder with its generated definition, keeping the
/// placeholder's id and name. A second merge for the same id is a no-op.
pub fn merge_generated_item(
    session: &mut SessionState,
    character: &mut CharacterState,
    catalog: &Catalog,
    placeholder_id: &str,
    mut definition: ItemDefinition,
) -> MergeOutcome {
    let Some(index) = session
        .pending_items
        .iter()
        .position(|r| r.placeholder_id == placeholder_id)
    else {
        return MergeOutcome::AlreadyMerged;
    };
    let request = session.pending_items.remove(index);

    definition.id = request.placeholder_id;
    definition.name = request.name;
    definition.placeholder = false;

    match session.catalog.iter_mut().find(|item| item.id == definition.id) {
        Some(entry) => *entry = definition.clone(),
        None => session.catalog.push(definition.clone()),
    }

    let equipped = session
        .inventory
        .iter()
        .any(|slot| slot.item_id == definition.id && slot.equipped);
    let mut directives = Vec::new();
    if equipped {
        remove_item_effects(character, &definition.id);
        directives = apply_item_effects(character, &definition);
        refresh_armor_class(character, session, catalog);
    }

    tracing::info!(
        item = %definition.id,
        reapplied = equipped,
        directives = directives.len(),
        "Generated item merged"
    );
    MergeOutcome::Merged {
        reapplied: equipped,
        directives,
    }
}

/// Drop a request whose generation failed; the placeholder stays in use.
pub fn abandon_request(session: &mut SessionState, placeholder_id: &str) -> bool {
    let before = session.pending_items.len();
    session
        .pending_items
        .retain(|r| r.placeholder_id != placeholder_id);
    session.pending_items.len() != before
}

/// Result of one background generation task
#[derive(Debug)]
pub struct GeneratedItem {
    pub placeholder_id: String,
    pub result: Result<ItemDefinition, GenerationError>,
}

/// Spawns generation tasks for pending requests, scoped to one session.
pub struct ItemGenerationQueue {
    generator: Arc<dyn ItemGeneratorPort>,
    cancel_token: CancellationToken,
    tx: mpsc::UnboundedSender<GeneratedItem>,
    rx: mpsc::UnboundedReceiver<GeneratedItem>,
    in_flight: HashSet<String>,
}

impl ItemGenerationQueue {
    pub fn new(generator: Arc<dyn ItemGeneratorPort>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generator,
            cancel_token: CancellationToken::new(),
            tx,
            rx,
            in_flight: HashSet::new(),
        }
    }

    /// Start a task for every request not already running. Returns how many started.
    pub fn spawn_pending(&mut self, pending: &[PendingItemRequest]) -> usize {
        let mut started = 0;
        for request in pending {
            if !self.in_flight.insert(request.placeholder_id.clone()) {
                continue;
            }
            started += 1;

            let generator = self.generator.clone();
            let cancel_token = self.cancel_token.clone();
            let tx = self.tx.clone();
            let request = request.clone();

            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::debug!(item = %request.name, "Item generation cancelled");
                    }
                    result = generator.generate(&request.name, &request.context) => {
                        let generated = GeneratedItem {
                            placeholder_id: request.placeholder_id,
                            result,
                        };
                        if tx.send(generated).is_err() {
                            tracing::debug!(item = %request.name, "Generation result dropped, session closed");
                        }
                    }
                }
            });
        }
        started
    }

    /// Collect results that have already arrived without waiting.
    pub fn drain_completed(&mut self) -> Vec<GeneratedItem> {
        let mut completed = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            self.in_flight.remove(&item.placeholder_id);
            completed.push(item);
        }
        completed
    }

    /// Wait for the next result. `None` when nothing is in flight.
    pub async fn next_completed(&mut self) -> Option<GeneratedItem> {
        if self.in_flight.is_empty() {
            return None;
        }
        let item = self.rx.recv().await?;
        self.in_flight.remove(&item.placeholder_id);
        Some(item)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Cancel every running task and start a fresh scope. Late results from
    /// cancelled tasks can no longer reach this queue.
    pub fn cancel(&mut self) {
        self.cancel_token.cancel();
        self.cancel_token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.tx = tx;
        self.rx = rx;
        self.in_flight.clear();
    }
}

impl Drop for ItemGenerationQueue {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// What a batch of completed results changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged: usize,
    /// Directive effects of merged items that are equipped
    pub directives: Vec<String>,
}

/// Merge every completed result into the session. Failures are logged and
/// the placeholder is kept.
pub fn apply_completed(
    completed: Vec<GeneratedItem>,
    session: &mut SessionState,
    character: &mut CharacterState,
    catalog: &Catalog,
) -> MergeReport {
    let mut report = MergeReport::default();
    for item in completed {
        match item.result {
            Ok(definition) => {
                if let MergeOutcome::Merged { directives, .. } =
                    merge_generated_item(session, character, catalog, &item.placeholder_id, definition)
                {
                    report.merged += 1;
                    report.directives.extend(directives);
                }
            }
            Err(e) => {
                tracing::warn!(item = %item.placeholder_id, error = %e, "Item generation failed, keeping placeholder");
                abandon_request(session, &item.placeholder_id);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockItemGeneratorPort;
    use chronicler_domain::{
        AbilityScores, InventorySlot, ItemCategory, ModifierTarget, SessionId,
    };

    fn placeholder_session() -> SessionState {
        let mut session = SessionState::new(SessionId::new());
        let mut placeholder = ItemDefinition::new("custom-moon-ring", "Moon Ring", ItemCategory::Magic);
        placeholder.placeholder = true;
        session.catalog.push(placeholder);
        session.pending_items.push(PendingItemRequest {
            placeholder_id: "custom-moon-ring".into(),
            name: "Moon Ring".into(),
            context: String::new(),
        });
        session.inventory.push(InventorySlot {
            item_id: "custom-moon-ring".into(),
            name: "Moon Ring".into(),
            quantity: 1,
            equipped: true,
        });
        session
    }

    fn generated() -> ItemDefinition {
        ItemDefinition::new("moonstone-ring", "Ring of the Moon", ItemCategory::Magic)
            .with_effect("+2 AC")
    }

    #[test]
    fn merge_keeps_identity_and_rederives_armor_class() {
        let catalog = Catalog::builtin();
        let mut session = placeholder_session();
        let mut character = CharacterState::new("Rook", "Fighter", AbilityScores::default());

        let outcome = merge_generated_item(
            &mut session,
            &mut character,
            &catalog,
            "custom-moon-ring",
            generated(),
        );

        assert_eq!(
            outcome,
            MergeOutcome::Merged {
                reapplied: true,
                directives: Vec::new(),
            }
        );
        let entry = session.session_item("custom-moon-ring").unwrap();
        assert!(!entry.placeholder);
        assert_eq!(entry.name, "Moon Ring");
        assert_eq!(character.modifiers.total(ModifierTarget::ArmorClass), 2);
        assert_eq!(character.armor_class, 12);
        assert!(session.pending_items.is_empty());
    }

    #[test]
    fn equipped_merge_returns_directive_effects() {
        let catalog = Catalog::builtin();
        let mut session = placeholder_session();
        let mut character = CharacterState::new("Rook", "Fighter", AbilityScores::default());
        let definition = generated().with_effect("TEMP_HP[player|5]");

        let report = apply_completed(
            vec![GeneratedItem {
                placeholder_id: "custom-moon-ring".into(),
                result: Ok(definition),
            }],
            &mut session,
            &mut character,
            &catalog,
        );

        assert_eq!(report.merged, 1);
        assert_eq!(report.directives, vec!["TEMP_HP[player|5]".to_string()]);
        assert_eq!(character.modifiers.total(ModifierTarget::ArmorClass), 2);
    }

    #[test]
    fn second_merge_is_a_no_op() {
        let catalog = Catalog::builtin();
        let mut session = placeholder_session();
        let mut character = CharacterState::new("Rook", "Fighter", AbilityScores::default());

        merge_generated_item(&mut session, &mut character, &catalog, "custom-moon-ring", generated());
        let snapshot = (session.clone(), character.clone());
        let again = merge_generated_item(
            &mut session,
            &mut character,
            &catalog,
            "custom-moon-ring",
            ItemDefinition::new("other", "Other", ItemCategory::Gear),
        );

        assert_eq!(again, MergeOutcome::AlreadyMerged);
        assert_eq!((session, character), snapshot);
    }

    #[tokio::test]
    async fn queue_delivers_results_and_failures_keep_placeholder() {
        let mut generator = MockItemGeneratorPort::new();
        generator
            .expect_generate()
            .returning(|_, _| Err(GenerationError::Unavailable));

        let mut queue = ItemGenerationQueue::new(Arc::new(generator));
        let mut session = placeholder_session();
        assert_eq!(queue.spawn_pending(&session.pending_items), 1);
        assert_eq!(queue.spawn_pending(&session.pending_items), 0);

        let completed = queue.next_completed().await.unwrap();
        let catalog = Catalog::builtin();
        let mut character = CharacterState::new("Rook", "Fighter", AbilityScores::default());
        let report = apply_completed(vec![completed], &mut session, &mut character, &catalog);

        assert_eq!(report, MergeReport::default());
        assert!(session.pending_items.is_empty());
        assert!(session.session_item("custom-moon-ring").unwrap().placeholder);
        assert_eq!(queue.in_flight(), 0);
    }

    #[tokio::test]
    async fn cancel_clears_in_flight_work() {
        let mut generator = MockItemGeneratorPort::new();
        generator
            .expect_generate()
            .returning(|_, _| Ok(generated()));

        let mut queue = ItemGenerationQueue::new(Arc::new(generator));
        queue.spawn_pending(&placeholder_session().pending_items);
        queue.cancel();

        assert_eq!(queue.in_flight(), 0);
        assert!(queue.next_completed().await.is_none());
        assert!(queue.drain_completed().is_empty());
    }
}
