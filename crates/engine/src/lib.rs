//! Chronicler Engine library.
//!
//! Interprets narrated text with embedded directives and applies them to a
//! play session exactly once.
//!
//! ## Structure
//!
//! - `use_cases/` - Dispatch orchestration, directive handlers, and the
//!   services they share
//! - `infrastructure/` - Ports and their adapters
//! - `interpreter` - Per-session composition of the above
//! - `config` - Environment configuration

pub mod config;
pub mod infrastructure;
pub mod interpreter;
pub mod use_cases;

pub use interpreter::{Collaborators, Interpreter, MessageOutput};
