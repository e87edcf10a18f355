//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Item generation (could swap the rule-based fallback for an LLM)
//! - Durable state (could swap JSON files for a database)
//! - World lookups (creature templates for encounters)
//! - Clock/Random (for testing)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronicler_domain::{CharacterState, CreatureTemplate, ItemDefinition, SessionId, SessionState};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation failed: {0}")]
    Failed(String),
    #[error("Generator unavailable")]
    Unavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Saver stopped")]
    SaverStopped,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("World lookup failed: {0}")]
    Failed(String),
}

// =============================================================================
// Infrastructure Types
// =============================================================================

/// Everything persisted for one session: its play state and the character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub session: SessionState,
    pub character: CharacterState,
}

// =============================================================================
// Ports
// =============================================================================

/// Produces full item definitions for names the catalogues don't know.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemGeneratorPort: Send + Sync {
    async fn generate(&self, name: &str, context: &str) -> Result<ItemDefinition, GenerationError>;
}

/// Read-whole-state / write-whole-state persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStorePort: Send + Sync {
    async fn load(&self, session_id: SessionId) -> Result<Option<SavedGame>, StoreError>;
    async fn save(&self, game: &SavedGame) -> Result<(), StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldLookupPort: Send + Sync {
    async fn find_creature(&self, name: &str) -> Result<Option<CreatureTemplate>, LookupError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait RandomPort: Send + Sync {
    /// Inclusive range.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    fn gen_uuid(&self) -> Uuid;
}
