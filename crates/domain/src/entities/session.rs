//! Per-session play state
//!
//! Owned by one session and mutated only by directive handlers. Everything
//! here round-trips through serde so a store can persist it between turns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::encounter::Encounter;
use super::item::ItemDefinition;
use super::spell::SpellEffectInstance;
use crate::ids::{EffectInstanceId, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySlot {
    pub item_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub equipped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestEntry {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// The sustained spell, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concentration {
    pub spell_name: String,
    /// Tracked effect instance kept alive by this concentration
    #[serde(default)]
    pub instance: Option<EffectInstanceId>,
}

/// An item generation request waiting on the external generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingItemRequest {
    pub placeholder_id: String,
    pub name: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: SessionId,
    #[serde(default)]
    pub inventory: Vec<InventorySlot>,
    #[serde(default)]
    pub currency: f64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub encounter: Option<Encounter>,
    #[serde(default)]
    pub effects: Vec<SpellEffectInstance>,
    #[serde(default)]
    pub concentration: Option<Concentration>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub visited: Vec<String>,
    #[serde(default)]
    pub relationships: BTreeMap<String, i32>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub quests: Vec<QuestEntry>,
    /// Items defined during this session (generated or placeholder)
    #[serde(default)]
    pub catalog: Vec<ItemDefinition>,
    #[serde(default)]
    pub pending_items: Vec<PendingItemRequest>,
}

impl SessionState {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            inventory: Vec::new(),
            currency: 0.0,
            conditions: Vec::new(),
            encounter: None,
            effects: Vec::new(),
            concentration: None,
            location: None,
            visited: Vec::new(),
            relationships: BTreeMap::new(),
            suggestions: Vec::new(),
            quests: Vec::new(),
            catalog: Vec::new(),
            pending_items: Vec::new(),
        }
    }

    pub fn slot_index(&self, item_id: &str) -> Option<usize> {
        self.inventory.iter().position(|s| s.item_id == item_id)
    }

    /// Slot lookup by item id or display name, ignoring case.
    pub fn find_slot_index(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        self.inventory.iter().position(|s| {
            s.item_id.eq_ignore_ascii_case(query) || s.name.eq_ignore_ascii_case(query)
        })
    }

    pub fn has_condition(&self, name: &str) -> bool {
        self.conditions
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn session_item(&self, item_id: &str) -> Option<&ItemDefinition> {
        self.catalog.iter().find(|i| i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_slot_matches_id_or_name() {
        let mut session = SessionState::new(SessionId::new());
        session.inventory.push(InventorySlot {
            item_id: "rope".into(),
            name: "Hempen Rope".into(),
            quantity: 1,
            equipped: false,
        });

        assert_eq!(session.find_slot_index("hempen rope"), Some(0));
        assert_eq!(session.find_slot_index("ROPE"), Some(0));
        assert_eq!(session.find_slot_index("torch"), None);
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut session = SessionState::new(SessionId::new());
        session.currency = 12.5;
        session.relationships.insert("Innkeeper".into(), -2);
        session.visited.push("Phandalin".into());

        let json = serde_json::to_string(&session).unwrap();
        let restored: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
