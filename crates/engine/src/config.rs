//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use chronicler_domain::SessionId;
use uuid::Uuid;

pub const DEFAULT_DATA_DIR: &str = "saves";
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 750;
pub const DEFAULT_CHUNK_SIZE: usize = 48;

const MAX_SAVE_DEBOUNCE_MS: u64 = 60_000;
const MAX_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding one JSON save per session
    pub data_dir: PathBuf,
    pub save_debounce: Duration,
    /// Characters per chunk when the runner replays a transcript
    pub chunk_size: usize,
    /// Session to resume; a fresh one is created when unset
    pub session: Option<SessionId>,
    pub character_name: String,
    pub character_class: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
            chunk_size: DEFAULT_CHUNK_SIZE,
            session: None,
            character_name: "Adventurer".into(),
            character_class: "Fighter".into(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Out-of-range or unparseable values
    /// are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("CHRONICLER_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }

        if let Some(raw) = lookup("CHRONICLER_SAVE_DEBOUNCE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms <= MAX_SAVE_DEBOUNCE_MS => {
                    config.save_debounce = Duration::from_millis(ms);
                }
                _ => tracing::warn!(
                    value = %raw,
                    max = MAX_SAVE_DEBOUNCE_MS,
                    "Invalid CHRONICLER_SAVE_DEBOUNCE_MS, using default"
                ),
            }
        }

        if let Some(raw) = lookup("CHRONICLER_CHUNK_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) if (1..=MAX_CHUNK_SIZE).contains(&size) => config.chunk_size = size,
                _ => tracing::warn!(
                    value = %raw,
                    max = MAX_CHUNK_SIZE,
                    "Invalid CHRONICLER_CHUNK_SIZE, using default"
                ),
            }
        }

        if let Some(raw) = lookup("CHRONICLER_SESSION") {
            match Uuid::parse_str(raw.trim()) {
                Ok(uuid) => config.session = Some(SessionId::from_uuid(uuid)),
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "Invalid CHRONICLER_SESSION, starting a new session"
                ),
            }
        }

        if let Some(name) = lookup("CHRONICLER_CHARACTER").filter(|v| !v.trim().is_empty()) {
            config.character_name = name.trim().to_string();
        }
        if let Some(class) = lookup("CHRONICLER_CLASS").filter(|v| !v.trim().is_empty()) {
            config.character_class = class.trim().to_string();
        }

        config
    }
}
