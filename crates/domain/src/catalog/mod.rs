//! Global catalogues of items, spells, and creatures

mod creatures;
mod inference;
mod items;
mod spells;

pub use creatures::{builtin_creatures, CreatureTemplate};
pub use inference::infer_item;
pub use items::builtin_items;
pub use spells::builtin_spells;

use crate::entities::{ItemDefinition, SpellDefinition};

/// Read-only global catalogue shared by every session
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<ItemDefinition>,
    spells: Vec<SpellDefinition>,
}

impl Catalog {
    pub fn new(items: Vec<ItemDefinition>, spells: Vec<SpellDefinition>) -> Self {
        Self { items, spells }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_items(), builtin_spells())
    }

    pub fn item(&self, query: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| item.matches(query))
    }

    pub fn spell(&self, query: &str) -> Option<&SpellDefinition> {
        self.spells.iter().find(|spell| spell.matches(query))
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }
}
