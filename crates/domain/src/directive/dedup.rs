//! Exactly-once bookkeeping for directive occurrences
//!
//! An occurrence is identified by its kind and where it sits in the message,
//! not by its content: two identical directives at different offsets are two
//! events, while the same directive re-seen after the buffer grows is one.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::kind::DirectiveKind;

/// Where a directive occurrence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Position {
    /// Byte offset in the message buffer
    Offset(usize),
    /// Re-injected from an item or spell effect. `origin` is the buffer
    /// offset of the directive that caused it, `index` its order among all
    /// directives injected on behalf of that origin.
    Injected { origin: usize, index: usize },
}

impl Position {
    /// Buffer offset this occurrence ultimately traces back to.
    pub fn origin(&self) -> usize {
        match self {
            Self::Offset(offset) => *offset,
            Self::Injected { origin, .. } => *origin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectiveKey {
    pub kind: DirectiveKind,
    pub position: Position,
}

impl DirectiveKey {
    pub fn new(kind: DirectiveKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Per-session registry of settled directive occurrences
#[derive(Debug, Clone, Default)]
pub struct DedupRegistry {
    settled: HashSet<DirectiveKey>,
    level_notice_sent: bool,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &DirectiveKey) -> bool {
        self.settled.contains(key)
    }

    /// Record an occurrence; returns false if it was already settled.
    pub fn mark(&mut self, key: DirectiveKey) -> bool {
        self.settled.insert(key)
    }

    /// Returns true the first time it is called for the current message.
    pub fn claim_level_notice(&mut self) -> bool {
        !std::mem::replace(&mut self.level_notice_sent, true)
    }

    /// Forget everything; called when a new message begins.
    pub fn reset(&mut self) {
        self.settled.clear();
        self.level_notice_sent = false;
    }

    pub fn len(&self) -> usize {
        self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_is_idempotent_per_key() {
        let mut registry = DedupRegistry::new();
        let key = DirectiveKey::new(DirectiveKind::Gold, Position::Offset(4));

        assert!(registry.mark(key));
        assert!(!registry.mark(key));
        assert!(registry.contains(&key));
        assert!(!registry.contains(&DirectiveKey::new(DirectiveKind::Gold, Position::Offset(12))));
    }

    #[test]
    fn injected_positions_are_distinct_from_offsets() {
        let mut registry = DedupRegistry::new();
        registry.mark(DirectiveKey::new(DirectiveKind::Heal, Position::Offset(3)));

        let injected = DirectiveKey::new(
            DirectiveKind::Heal,
            Position::Injected {
                origin: 3,
                index: 0,
            },
        );
        assert!(!registry.contains(&injected));
        assert_eq!(injected.position.origin(), 3);
    }

    #[test]
    fn level_notice_is_claimed_once_until_reset() {
        let mut registry = DedupRegistry::new();
        assert!(registry.claim_level_notice());
        assert!(!registry.claim_level_notice());

        registry.reset();
        assert!(registry.claim_level_notice());
        assert!(registry.is_empty());
    }
}
