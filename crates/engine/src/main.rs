//! Chronicler Engine - transcript runner.
//!
//! Replays a narration file through the interpreter in fixed-size chunks, the
//! way a streaming generator would deliver it, and prints what the player
//! would see.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chronicler_domain::catalog::Catalog;
use chronicler_domain::{AbilityScores, CharacterState, SessionState};
use chronicler_engine::config::EngineConfig;
use chronicler_engine::infrastructure::bestiary::BuiltinBestiary;
use chronicler_engine::infrastructure::clock::{SystemClock, SystemRandom};
use chronicler_engine::infrastructure::json_store::JsonFileStore;
use chronicler_engine::infrastructure::ports::{SavedGame, StateStorePort};
use chronicler_engine::infrastructure::rule_based_generator::RuleBasedItemGenerator;
use chronicler_engine::interpreter::{Collaborators, Interpreter};
use chronicler_engine::use_cases::dispatch::{Notification, NotificationKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronicler_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let transcript_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: chronicler-engine <transcript-file>")?;
    let config = EngineConfig::from_env();
    tracing::info!(
        data_dir = %config.data_dir.display(),
        chunk_size = config.chunk_size,
        "Starting Chronicler Engine"
    );

    let store = Arc::new(JsonFileStore::new(&config.data_dir));
    let game = load_or_create(store.as_ref(), &config).await?;
    tracing::info!(
        session = %game.session.id,
        character = %game.character.name,
        level = game.character.level,
        "Session ready"
    );

    let collaborators = Collaborators {
        generator: Arc::new(RuleBasedItemGenerator::new()),
        store,
        world: Arc::new(BuiltinBestiary::default()),
        random: Arc::new(SystemRandom),
        clock: Arc::new(SystemClock),
    };
    let mut interpreter =
        Interpreter::new(game, Catalog::builtin(), collaborators, config.save_debounce);

    let transcript = tokio::fs::read_to_string(&transcript_path)
        .await
        .with_context(|| format!("reading {}", transcript_path.display()))?;

    for message in transcript.split("\n---\n").filter(|m| !m.trim().is_empty()) {
        interpreter.begin_message();
        let chars: Vec<char> = message.chars().collect();
        for chunk in chars.chunks(config.chunk_size) {
            let chunk: String = chunk.iter().collect();
            print_notifications(&interpreter.feed_chunk(&chunk));
        }
        let output = interpreter.finish_message().await;
        print_notifications(&output.notifications);
        println!("{}\n", output.display_text);
    }

    let merged = interpreter.settle_generation().await;
    if merged > 0 {
        tracing::info!(count = merged, "Generated items merged");
    }
    print_notifications(&interpreter.take_notifications());
    interpreter.flush().await?;

    let character = interpreter.character();
    println!(
        "{} the {} (level {}): HP {}/{}, AC {}, XP {}, gold {:.2}",
        character.name,
        character.class_name,
        character.level,
        character.hp,
        character.max_hp,
        character.armor_class,
        character.xp,
        interpreter.session().currency
    );
    println!("Session saved as {}", interpreter.session().id);
    Ok(())
}

async fn load_or_create(
    store: &dyn StateStorePort,
    config: &EngineConfig,
) -> anyhow::Result<SavedGame> {
    if let Some(session_id) = config.session {
        if let Some(game) = store
            .load(session_id)
            .await
            .with_context(|| format!("loading session {}", session_id))?
        {
            return Ok(game);
        }
        tracing::warn!(session = %session_id, "No save found, starting a new one");
    }

    let session = SessionState::new(config.session.unwrap_or_default());
    let character = CharacterState::new(
        config.character_name.clone(),
        config.character_class.clone(),
        AbilityScores {
            strength: 15,
            dexterity: 14,
            constitution: 13,
            intelligence: 12,
            wisdom: 10,
            charisma: 8,
        },
    );
    Ok(SavedGame { session, character })
}

fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        let badge = match notification.kind {
            NotificationKind::Info => "*",
            NotificationKind::Refusal => "!",
            NotificationKind::LevelAvailable => "^",
            NotificationKind::ConcentrationBroken => "~",
            NotificationKind::Roll => "#",
        };
        println!("  {} {}", badge, notification.message);
    }
}

fn load_dotenv_from_repo_root() {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir.join("../..");

    for file in [".env.local", ".env"] {
        let path = repo_root.join(file);
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}
