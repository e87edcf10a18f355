//! Inventory directive errors.

use chronicler_domain::DomainError;

/// Errors that can occur while applying an inventory directive.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Item not found: {0}")]
    ItemNotFound(String),
    #[error("{0} cannot be used")]
    NotUsable(String),
    #[error("Not enough gold for {item}: costs {cost:.2}, have {available:.2}")]
    InsufficientFunds {
        item: String,
        cost: f64,
        available: f64,
    },
    #[error("Invalid arguments: {0}")]
    Invalid(#[from] DomainError),
}

impl InventoryError {
    /// Whether the player should be told, as opposed to a silent skip.
    pub fn is_refusal(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }
}
