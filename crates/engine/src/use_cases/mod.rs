//! Use cases - directive handling.
//!
//! `dispatch` runs the handler chain; each handler module owns one family of
//! directive kinds. `effects`, `equipment`, `item_generation` and `level_up`
//! are services the handlers and the interpreter share.

pub mod combat;
pub mod dice_roll;
pub mod dispatch;
pub mod effects;
pub mod encounter;
pub mod equipment;
pub mod inventory;
pub mod item_generation;
pub mod level_up;
pub mod narrative;
pub mod rest;
pub mod spellcasting;

pub use dispatch::{Dispatcher, Notification, NotificationKind, Outcome};
pub use level_up::{AbilityImprovement, LevelUpDraft};
